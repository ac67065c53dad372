macro_rules! platform {
    { unix => { $($unix:tt)* }, windows => { $($windows:tt)* }, } => {
        if cfg!(unix) {
            #[cfg(unix)] { $($unix)* }
            #[cfg(not(unix))] { unreachable!() }
        } else if cfg!(windows) {
            #[cfg(windows)] { $($windows)* }
            #[cfg(not(windows))] { unreachable!() }
        } else {
            #[cfg(not(any(unix, windows)))] compile_error!("Unsupported platform");
            unreachable!()
        }
    }
}

/// Like `writeln!`, but nicely wraps lines.
///
/// Unlike `writeln` and like `eprintln` panics if it can't write to
/// the specified stream.
macro_rules! wwriteln {
    {
        stream=$stream: expr
    } => {{
        let stream: &mut dyn std::io::Write = $stream;
        if let Err(err) = writeln!(stream) {
            panic!("Error writing to output stream: {}", err);
        }
    }};

    {
        stream=$stream: expr,
        initial_indent=$ii: expr,
        subsequent_indent=$si: expr,
        $($arg: expr),*
    } => {{
        let stream: &mut dyn std::io::Write = $stream;
        let ii = $ii;
        let si = $si;
        crate::output::wrapping::iwwriteln(
            stream,
            ii.as_ref(), si.as_ref(),
            format_args!($($arg),*))
    }};

    {
        stream=$stream: expr,
        initial_indent=$ii: expr,
        $($arg: expr),*
    } => {{
        let stream: &mut dyn std::io::Write = $stream;
        let ii = $ii;
        let si = format!("{:1$}", "", ii.len());
        crate::output::wrapping::iwwriteln(
            stream, ii.as_ref(), si.as_ref(),
            format_args!($($arg),*))
    }};

    {
        stream=$stream: expr,
        $($arg: expr),*
    } => {{
        let stream: &mut dyn std::io::Write = $stream;
        crate::output::wrapping::wwriteln(
            stream, format_args!($($arg),*))
    }};
}

/// Like eprintln, but nicely wraps lines.
macro_rules! weprintln {
    { } => {
        wwriteln!(stream=&mut std::io::stderr())
    };

    {
        initial_indent=$ii: expr,
        subsequent_indent=$si: expr,
        $($arg: expr),*
    } => {
        wwriteln!(stream=&mut std::io::stderr(),
                  initial_indent=$ii,
                  subsequent_indent=$si,
                  $($arg),*)
    };

    {
        initial_indent=$ii: expr,
        $($arg: expr),*
    } => {
        wwriteln!(stream=&mut std::io::stderr(),
                  initial_indent=$ii,
                  $($arg),*)
    };

    {
        $($arg: expr),*
    } => {
        wwriteln!(stream=&mut std::io::stderr(), $($arg),*)
    };
}
