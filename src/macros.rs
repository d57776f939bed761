macro_rules! emit {
    ($emitter:expr, $opcode:expr) => {
        writeln!($emitter.output, "    {}", $opcode)
    };

    ($emitter:expr, $opcode:expr, $($format:tt)*) => {{
        write!($emitter.output, "    {} ", $opcode)?;
        writeln!($emitter.output, $($format)*)
    }};
}
