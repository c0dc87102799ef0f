use std::io::Write;
use std::path::PathBuf;

#[derive(clap::ValueEnum, Clone, Debug)]
pub enum Format {
    Table,
    Jsonl,
    Csv,
}

#[derive(clap::Parser)]
#[group(id = "output::Args")]
pub struct Args {
    /// Write the output to this file instead of the terminal.
    #[arg(long, short = 'o')]
    output: Option<PathBuf>,
    #[arg(long, short='f', value_enum, default_value_t = Format::Table)]
    format: Format,
}

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("could not open the specified output file at {1:?}")]
    OpenOutputFile(#[source] std::io::Error, PathBuf),
    #[error("could not write data to the output file at {1:?}")]
    WriteFile(#[source] std::io::Error, PathBuf),
    #[error("could not write data to the terminal")]
    WriteStdout(#[source] std::io::Error),
    #[error("could not serialize the record to JSON")]
    SerializeJson(#[source] serde_json::Error),
    #[error("could not serialize the record to CSV")]
    SerializeCsv(#[source] csv::Error),
}

impl Args {
    pub fn to_output(self) -> Result<Output, Error> {
        let io: Box<dyn Write> = match &self.output {
            None => Box::new(std::io::stdout().lock()),
            Some(path) => Box::new(
                std::fs::OpenOptions::new()
                    .write(true)
                    .create(true)
                    .truncate(true)
                    .open(path)
                    .map_err(|e| Error::OpenOutputFile(e, path.clone()))?,
            ),
        };
        let sink = match &self.format {
            Format::Table => {
                let mut comfy = comfy_table::Table::new();
                comfy.set_content_arrangement(comfy_table::ContentArrangement::Dynamic);
                Sink::Table { comfy, io }
            }
            Format::Jsonl => Sink::Jsonl { io },
            Format::Csv => Sink::Csv { writer: csv::Writer::from_writer(io) },
        };
        Ok(Output { path: self.output, sink })
    }
}

/// A row-oriented sink that accumulates a table or streams JSONL/CSV
/// records. Rows are handed over lazily so the unused representation is
/// never built.
pub struct Output {
    path: Option<PathBuf>,
    sink: Sink,
}

enum Sink {
    Table { comfy: comfy_table::Table, io: Box<dyn Write> },
    Jsonl { io: Box<dyn Write> },
    Csv { writer: csv::Writer<Box<dyn Write>> },
}

impl Output {
    pub fn headers(&mut self, headers: Vec<&'static str>) -> Result<(), Error> {
        match &mut self.sink {
            Sink::Table { comfy, .. } => {
                comfy.set_header(headers);
                Ok(())
            }
            Sink::Jsonl { .. } => Ok(()),
            Sink::Csv { writer } => writer.write_record(headers).map_err(Error::SerializeCsv),
        }
    }

    pub fn result<R: serde::Serialize>(
        &mut self,
        table_row: impl FnOnce() -> Vec<String>,
        serde_record: impl FnOnce() -> R,
    ) -> Result<(), Error> {
        match &mut self.sink {
            Sink::Table { comfy, .. } => {
                comfy.add_row(table_row());
                Ok(())
            }
            Sink::Jsonl { io } => {
                serde_json::to_writer(&mut *io, &serde_record()).map_err(Error::SerializeJson)?;
                writeln!(io).map_err(|e| write_error(&self.path, e))
            }
            Sink::Csv { writer } => {
                writer.write_record(table_row()).map_err(Error::SerializeCsv)
            }
        }
    }

    pub fn commit(mut self) -> Result<(), Error> {
        match &mut self.sink {
            Sink::Table { comfy, io } => {
                writeln!(io, "{comfy}").map_err(|e| write_error(&self.path, e))?;
                io.flush().map_err(|e| write_error(&self.path, e))
            }
            Sink::Jsonl { io } => io.flush().map_err(|e| write_error(&self.path, e)),
            Sink::Csv { writer } => {
                writer.flush().map_err(|e| write_error(&self.path, e))
            }
        }
    }
}

fn write_error(path: &Option<PathBuf>, e: std::io::Error) -> Error {
    match path {
        None => Error::WriteStdout(e),
        Some(p) => Error::WriteFile(e, p.clone()),
    }
}
