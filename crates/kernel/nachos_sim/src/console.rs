use std::io::{self, Write as _};

/// The device behind every process's standard output.
#[derive(Debug, Default)]
pub(crate) struct Console {
    output: Vec<u8>,
    echo: bool,
}

impl Console {
    pub(crate) fn new(echo: bool) -> Self {
        Self {
            output: Vec::new(),
            echo,
        }
    }

    pub(crate) fn write(&mut self, bytes: &[u8]) {
        self.output.extend_from_slice(bytes);
        if self.echo {
            let mut stdout = io::stdout().lock();
            let _ = stdout.write_all(bytes);
            let _ = stdout.flush();
        }
    }

    pub(crate) fn contents(&self) -> String {
        String::from_utf8_lossy(&self.output).into_owned()
    }

    pub(crate) fn take(&mut self) -> String {
        let output = std::mem::take(&mut self.output);
        String::from_utf8_lossy(&output).into_owned()
    }
}
