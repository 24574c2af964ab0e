//! InfluxDB delivery client.

use std::time::Duration;

use hueflux_common::{Error, Result};

use crate::config::InfluxConfig;

/// Client for the sink's HTTP write endpoint.
///
/// The write URL is resolved once at construction; every snapshot becomes
/// one `POST /write?db=<db>&precision=s` with a line-protocol body.
/// Failures are returned to the caller, which logs and drops the sample.
/// No retry, no queueing.
pub struct InfluxSink {
    http: reqwest::Client,
    write_url: String,
    user: Option<String>,
    password: Option<String>,
}

impl InfluxSink {
    /// Create a client for the configured sink.
    pub fn new(config: &InfluxConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            write_url: config.write_url(),
            user: config.user.clone(),
            password: config.password.clone(),
        })
    }

    /// The resolved write endpoint.
    pub fn write_url(&self) -> &str {
        &self.write_url
    }

    /// Write one line-protocol payload.
    pub async fn write(&self, line: &str) -> Result<()> {
        let mut request = self.http.post(&self.write_url).body(line.to_string());

        if let Some(user) = &self.user {
            request = request.basic_auth(user, self.password.as_deref());
        }

        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Sink(format!("HTTP {}: {}", status, body.trim())));
        }

        Ok(())
    }
}

/// Tag value identifying this collector host: the local interface address
/// used to reach the sink, with separator characters replaced so the
/// result is a bare line-protocol tag value.
///
/// Opens a UDP socket towards the sink to discover which local address
/// the kernel routes through; nothing is actually sent.
pub fn local_host_tag(sink_url: &str) -> Option<String> {
    let url = reqwest::Url::parse(sink_url).ok()?;
    let host = url.host_str()?;
    let port = url.port_or_known_default()?;

    let socket = std::net::UdpSocket::bind("0.0.0.0:0").ok()?;
    socket.connect((host, port)).ok()?;
    let local = socket.local_addr().ok()?;

    Some(local.ip().to_string().replace(['.', ':'], "_"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(url: &str) -> InfluxConfig {
        InfluxConfig {
            url: Some(url.to_string()),
            host: None,
            port: 8086,
            db: "home".to_string(),
            user: Some("writer".to_string()),
            password: Some("secret".to_string()),
            timeout_secs: 5,
            measurement: "hue".to_string(),
        }
    }

    #[test]
    fn test_write_url_resolution() {
        let sink = InfluxSink::new(&config("http://influx.local:8086")).unwrap();
        assert_eq!(
            sink.write_url(),
            "http://influx.local:8086/write?db=home&precision=s"
        );
    }

    #[test]
    fn test_local_host_tag_loopback() {
        // Loopback routes through 127.0.0.1; dots become underscores.
        let tag = local_host_tag("http://127.0.0.1:8086").unwrap();
        assert_eq!(tag, "127_0_0_1");
    }

    #[test]
    fn test_local_host_tag_bad_url() {
        assert_eq!(local_host_tag("not a url"), None);
    }

    /// One-shot HTTP server answering with a canned status line.
    async fn one_shot_server(response: &'static str) -> std::net::SocketAddr {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 2048];
            let _ = stream.read(&mut buf).await;
            stream.write_all(response.as_bytes()).await.unwrap();
        });

        addr
    }

    #[tokio::test]
    async fn test_write_success_on_204() {
        let addr = one_shot_server("HTTP/1.1 204 No Content\r\ncontent-length: 0\r\n\r\n").await;
        let sink = InfluxSink::new(&config(&format!("http://{}", addr))).unwrap();

        sink.write("hue,host=test value=1").await.unwrap();
    }

    #[tokio::test]
    async fn test_write_maps_rejection_to_sink_error() {
        let addr = one_shot_server(
            "HTTP/1.1 500 Internal Server Error\r\ncontent-length: 0\r\n\r\n",
        )
        .await;
        let sink = InfluxSink::new(&config(&format!("http://{}", addr))).unwrap();

        let err = sink.write("hue,host=test value=1").await.unwrap_err();
        assert!(matches!(err, Error::Sink(_)));
    }

    #[tokio::test]
    async fn test_write_unreachable_sink_is_an_error_not_a_panic() {
        // Port 1 on loopback refuses connections.
        let sink = InfluxSink::new(&config("http://127.0.0.1:1")).unwrap();
        let err = sink.write("hue,host=test value=1").await.unwrap_err();
        assert!(matches!(err, Error::Http(_)));
    }
}
