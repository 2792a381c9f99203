use std::collections::BTreeMap;
use std::io::{self, Write};

use anyhow::Context;
use log::{info, warn};
use rapid7_hmac::{Algorithm, ClientRequestLike, SignedHeaders, SigningConfig, SigningExt};
use reqwest::blocking::{Client, Request};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Method;
use structopt::StructOpt;
use url::Url;

#[derive(Debug, StructOpt)]
#[structopt(
    name = "turnt",
    about = "A helper app to make signed requests against Turnstile."
)]
struct Opt {
    /// The URL to send the request to.
    url: Url,

    /// HTTP request method.
    #[structopt(short = "X", long, default_value = "GET")]
    method: String,

    /// HTTP request payload.
    #[structopt(short = "d", long, default_value = "{}")]
    payload: String,

    /// Digest signing scheme. One of: SHA256, SHA512.
    #[structopt(long, default_value = "SHA256")]
    digest: String,

    /// HTTP request headers, as a JSON object of names to values.
    #[structopt(short = "H", long = "header", default_value = "{}")]
    headers: String,

    /// Identity key for the request.
    #[structopt(short = "u", long, env = "TURNT_IDENTITY")]
    identity: Option<String>,

    /// Secret key for the request.
    #[structopt(short = "p", long, env = "TURNT_SECRET", hide_env_values = true)]
    secret: Option<String>,

    /// Print the signed request instead of sending it.
    #[structopt(long)]
    dry_run: bool,
}

impl Opt {
    fn signing_config(&self) -> anyhow::Result<SigningConfig> {
        let identity = self.identity.as_deref().unwrap_or_default();
        let secret = self.secret.as_deref().unwrap_or_default();

        // Credentials are checked before the algorithm
        let config = SigningConfig::new(identity, secret.as_bytes())?;
        let algorithm: Algorithm = self.digest.parse()?;

        Ok(config.with_algorithm(algorithm))
    }

    fn method(&self) -> anyhow::Result<Method> {
        Method::from_bytes(self.method.to_ascii_uppercase().as_bytes())
            .with_context(|| format!("Invalid method {:?}", self.method))
    }

    fn extra_headers(&self) -> anyhow::Result<HeaderMap> {
        let headers: BTreeMap<String, String> =
            serde_json::from_str(&self.headers).context("Headers must be a JSON object")?;

        let mut map = HeaderMap::new();
        for (name, value) in headers {
            let header_name = HeaderName::from_bytes(name.as_bytes())
                .with_context(|| format!("{:?}", name))?;
            let header_value =
                HeaderValue::from_str(&value).with_context(|| format!("{:?}", value))?;
            map.insert(header_name, header_value);
        }
        Ok(map)
    }

    fn build_request(&self, client: &Client) -> anyhow::Result<Request> {
        let req = client
            .request(self.method()?, self.url.clone())
            .headers(self.extra_headers()?)
            .body(self.payload.clone())
            .build()?;
        Ok(req)
    }
}

fn write_request<W: Write>(req: &Request, payload: &str, writer: &mut W) -> io::Result<()> {
    writeln!(writer, "{} {} HTTP/1.1", req.method(), req.url())?;
    for (name, value) in req.headers() {
        writeln!(writer, "{}: {}", name, value.to_str().unwrap_or("<binary>"))?;
    }
    writeln!(writer)?;
    writeln!(writer, "{}", payload)
}

/// Lines describing what went into the signature. The identity is left out.
fn signing_trace(req: &Request, signed: &SignedHeaders) -> Vec<String> {
    vec![
        format!("Using method: {}", req.method()),
        format!("Using URI: {}", ClientRequestLike::uri(req)),
        format!(
            "Using host: {}",
            ClientRequestLike::host(req).unwrap_or_default()
        ),
        format!("Using date: {}", signed.date()),
        format!("Using digest: {}", signed.digest()),
        format!("Using signature: {}", signed.signature()),
    ]
}

/// Re-indents a JSON body, or returns it untouched if it is not JSON.
fn pretty_body(body: &str) -> String {
    match serde_json::from_str::<serde_json::Value>(body) {
        Ok(value) => serde_json::to_string_pretty(&value).unwrap_or_else(|_| body.into()),
        Err(e) => {
            warn!("Response body is not JSON: {}", e);
            body.into()
        }
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let opt = Opt::from_args();
    let config = opt.signing_config()?;

    let client = Client::new();
    let mut req = opt.build_request(&client)?;
    let signed = req.sign(&config)?;

    for line in signing_trace(&req, &signed) {
        info!("{}", line);
    }

    if opt.dry_run {
        write_request(&req, &opt.payload, &mut io::stdout().lock())?;
        return Ok(());
    }

    let resp = client.execute(req).context("Request failed")?;
    info!("Response status: {}", resp.status());

    let body = resp.text().context("Failed to read response body")?;
    info!("Response: \n{}", pretty_body(&body));

    Ok(())
}
