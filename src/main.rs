use std::sync::Arc;

use anyhow::Context;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use url::Url;

use castor::config::Config;
use castor::protocol::response::Response;
use castor::request::{DEFAULT_PORT, RequestBuilder};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .init();

    let arg = std::env::args()
        .nth(1)
        .context("usage: castor <gemini-url>")?;
    let url = Url::parse(&arg).context("invalid URL")?;
    let host = url.host_str().context("URL has no host")?.to_string();

    let cfg = Config::load();
    let options = Arc::new(cfg.request_options());

    let request = RequestBuilder::with_options(host, options)
        .scheme(url.scheme())
        .port(url.port().unwrap_or(DEFAULT_PORT))
        .path(url.path())
        .encoded_query(url.query().unwrap_or(""))
        .build()?;

    let response = request.send().await?;

    println!("{}", response.header());
    println!("{:?} ({})", response.status(), response.status().code());
    println!();

    match response {
        Response::Success { mut body, .. } => {
            let mut stdout = tokio::io::stdout();
            let mut chunk = [0u8; 8192];
            loop {
                let n = body.read(&mut chunk).await?;
                if n == 0 {
                    break;
                }
                stdout.write_all(&chunk[..n]).await?;
            }
            stdout.flush().await?;
        }
        Response::Input { prompt, .. } => {
            println!("input expected: {}", prompt.unwrap_or_default());
        }
        Response::Redirect { uri, .. } => match uri {
            Some(uri) => println!("redirected to {uri}"),
            None => println!("redirected without a usable URI"),
        },
        Response::TemporaryFailure { message, .. }
        | Response::PermanentFailure { message, .. }
        | Response::AuthRequired { message, .. }
        | Response::Error { message, .. } => {
            println!("{}", message.unwrap_or_default());
        }
    }

    Ok(())
}
