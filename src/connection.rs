use std::time::Duration;

use futures::{SinkExt as _, StreamExt as _};
use tokio::net::TcpStream;
use tokio_util::codec::Framed;
use tracing::{debug, info};

use crate::protocol::{LuxtronikCodec, Request, Response};

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("could not connect to `{1}` over TCP")]
    Connect(#[source] std::io::Error, String),
    #[error("could not send out the request")]
    Send(#[source] std::io::Error),
    #[error("could not read data from the stream")]
    Receive(#[source] std::io::Error),
    #[error("the controller closed the connection")]
    Closed,
    #[error("the controller did not respond within {}", humantime::format_duration(*.0))]
    Timeout(Duration),
    #[error("the controller replied to a different request than the one sent")]
    UnexpectedResponse,
}

/// One exchange with a controller.
///
/// The protocol is strictly sequential: one request goes out, one reply
/// comes back. All retry and reconnect policy is left to the caller; the
/// decoded register payload is handed over as plain `Vec<i32>`.
pub struct Connection {
    framed: Framed<TcpStream, LuxtronikCodec>,
    timeout: Duration,
}

impl Connection {
    pub async fn connect(address: &str, timeout: Duration) -> Result<Self, Error> {
        let stream = TcpStream::connect(address)
            .await
            .map_err(|e| Error::Connect(e, address.to_string()))?;
        info!(message = "connected", address);
        Ok(Self { framed: Framed::new(stream, LuxtronikCodec {}), timeout })
    }

    /// Fetch one full telemetry snapshot as raw registers.
    pub async fn read_calculations(&mut self) -> Result<Vec<i32>, Error> {
        match self.request(Request::GetCalculations).await? {
            Response::Calculations { status, values } => {
                debug!(message = "received calculations", status, count = values.len());
                Ok(values)
            }
            _ => Err(Error::UnexpectedResponse),
        }
    }

    /// Write one parameter register; returns the value the controller
    /// acknowledged.
    pub async fn write_parameter(&mut self, index: i32, value: i32) -> Result<i32, Error> {
        match self.request(Request::SetParameter { index, value }).await? {
            Response::ParameterSet { value } => {
                debug!(message = "parameter written", index, value);
                Ok(value)
            }
            _ => Err(Error::UnexpectedResponse),
        }
    }

    async fn request(&mut self, request: Request) -> Result<Response, Error> {
        self.framed.send(&request).await.map_err(Error::Send)?;
        tokio::time::timeout(self.timeout, self.framed.next())
            .await
            .map_err(|_| Error::Timeout(self.timeout))?
            .ok_or(Error::Closed)?
            .map_err(Error::Receive)
    }
}
