/*
 * Copyright (c) Microsoft Corporation.
 * Licensed under the MIT license.
 */

/// Where reports are written: `stdout` in the binary, a buffer in tests.
pub trait Output {
    fn sink(&mut self) -> &mut dyn std::io::Write;
}

// Lets `write!(output, ..)` take a `&mut dyn Output` directly.
impl std::io::Write for &mut dyn Output {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.sink().write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.sink().flush()
    }
}

/// The [`Output`] used by the binary.
pub fn default() -> DefaultOutput {
    DefaultOutput::default()
}

/// Writes to `stdout`.
#[derive(Debug)]
pub struct DefaultOutput(std::io::Stdout);

impl Default for DefaultOutput {
    fn default() -> Self {
        Self(std::io::stdout())
    }
}

impl Output for DefaultOutput {
    fn sink(&mut self) -> &mut dyn std::io::Write {
        &mut self.0
    }
}

/// Collects everything written into a byte buffer.
#[derive(Debug, Default)]
pub struct Memory(Vec<u8>);

impl Memory {
    pub fn new() -> Self {
        Self::default()
    }

    /// The bytes written so far.
    pub fn into_inner(self) -> Vec<u8> {
        self.0
    }
}

impl Output for Memory {
    fn sink(&mut self) -> &mut dyn std::io::Write {
        &mut self.0
    }
}

///////////
// Tests //
///////////
