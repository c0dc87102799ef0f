pub mod fields {
    use crate::output;
    use crate::registers::CALCULATIONS;

    /// Search and output the known telemetry fields.
    #[derive(clap::Parser)]
    pub struct Args {
        /// Only show fields whose name or index matches this pattern.
        filter: Option<String>,
        #[clap(flatten)]
        output: output::Args,
    }

    #[derive(thiserror::Error, Debug)]
    pub enum Error {
        #[error(transparent)]
        Output(#[from] output::Error),
    }

    #[derive(serde::Serialize)]
    pub struct FieldSchema {
        pub index: usize,
        pub offset: usize,
        pub name: &'static str,
        pub kind: &'static str,
        pub unit: Option<&'static str>,
        pub registers: usize,
        pub writable: bool,
    }

    impl FieldSchema {
        pub fn is_match(&self, pattern: &str) -> bool {
            let pattern = pattern.to_uppercase();
            if self.name.to_uppercase().contains(&pattern) {
                return true;
            }
            self.index.to_string() == pattern
        }
    }

    pub fn run(args: Args) -> Result<(), Error> {
        let mut output = args.output.to_output()?;
        output.headers(vec!["Index", "Offset", "Name", "Kind", "Unit", "Registers", "Writable"])?;
        for (index, field) in CALCULATIONS.fields().iter().enumerate() {
            let row = FieldSchema {
                index,
                offset: CALCULATIONS.register_offset(index).unwrap_or(0),
                name: field.name,
                kind: field.data_type.kind_name(),
                unit: field.data_type.unit(),
                registers: field.data_type.registers(),
                writable: field.data_type.encodable(),
            };
            if let Some(pattern) = &args.filter {
                if !row.is_match(pattern) {
                    continue;
                }
            }
            output.result(
                || {
                    vec![
                        row.index.to_string(),
                        row.offset.to_string(),
                        row.name.to_string(),
                        row.kind.to_string(),
                        row.unit.unwrap_or_default().to_string(),
                        row.registers.to_string(),
                        if row.writable { "yes" } else { "no" }.to_string(),
                    ]
                },
                || &row,
            )?;
        }
        output.commit()?;
        Ok(())
    }
}

pub mod read {
    use crate::connection::Connection;
    use crate::datatypes::Value;
    use crate::output;
    use crate::protocol;
    use crate::registers::CALCULATIONS;
    use crate::vector::DataVector;

    /// Read and decode the current telemetry snapshot from a controller.
    #[derive(clap::Parser)]
    pub struct Args {
        /// Controller address, `HOST` or `HOST:PORT`.
        address: String,
        /// Give up on the controller response after this long.
        #[arg(long, default_value = "5s", value_parser = humantime::parse_duration)]
        timeout: std::time::Duration,
        /// Only show fields whose name matches this pattern.
        #[arg(long, short = 'n')]
        filter: Option<String>,
        #[clap(flatten)]
        output: output::Args,
    }

    #[derive(thiserror::Error, Debug)]
    pub enum Error {
        #[error("could not construct the async runtime")]
        CreateRuntime(#[source] std::io::Error),
        #[error(transparent)]
        Connection(#[from] crate::connection::Error),
        #[error("could not interpret the controller snapshot")]
        Load(#[source] crate::vector::LoadError),
        #[error(transparent)]
        Output(#[from] output::Error),
    }

    #[derive(serde::Serialize)]
    struct ValueRecord<'a> {
        index: usize,
        name: &'a str,
        value: &'a Value,
    }

    pub fn run(args: Args) -> Result<(), Error> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(Error::CreateRuntime)?;
        let address = with_default_port(&args.address);
        let raw = runtime.block_on(async {
            let mut connection = Connection::connect(&address, args.timeout).await?;
            connection.read_calculations().await
        })?;
        let vector = DataVector::load(&CALCULATIONS, &raw).map_err(Error::Load)?;

        let mut output = args.output.to_output()?;
        output.headers(vec!["Index", "Name", "Value"])?;
        for entry in vector.iter() {
            if let Some(pattern) = &args.filter {
                if !entry.name.to_uppercase().contains(&pattern.to_uppercase()) {
                    continue;
                }
            }
            output.result(
                || {
                    vec![
                        entry.index.to_string(),
                        entry.name.to_string(),
                        entry.value.to_string(),
                    ]
                },
                || ValueRecord { index: entry.index, name: entry.name, value: entry.value },
            )?;
        }
        output.commit()?;
        Ok(())
    }

    fn with_default_port(address: &str) -> String {
        if address.contains(':') {
            address.to_string()
        } else {
            format!("{address}:{}", protocol::PORT)
        }
    }
}
