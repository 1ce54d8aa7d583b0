/// Print a standardized warning line to stderr (color-aware).
pub fn warn_print(msg: &str) {
    let use_err = crate::color_enabled_stderr();
    eprintln!(
        "{}",
        crate::paint(use_err, "\x1b[33;1m", &format!("warning: {}", msg))
    );
}

/// Print every advisory warning collected while building an invocation.
pub fn warn_print_all<S: AsRef<str>>(msgs: &[S]) {
    for m in msgs {
        warn_print(m.as_ref());
    }
}
