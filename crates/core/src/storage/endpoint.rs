//! URL rewriting for local storage emulators.
//!
//! An emulator is usually reachable under a container hostname from the
//! server, but under `localhost` from the machine running the client.

use url::{Position, Url};

use super::error::StorageError;

/// Host every rewritten URL points to.
pub const LOCAL_HOST: &str = "localhost";

/// Replace the origin of `signed_url` with `http://localhost:<port>`.
///
/// The port is kept from the original URL (or its scheme default); path and
/// query, including the signature, are left untouched.
pub fn rewrite_to_localhost(signed_url: &str) -> Result<String, StorageError> {
    let url = Url::parse(signed_url).map_err(|e| StorageError::InvalidUrl(e.to_string()))?;
    let port = url
        .port_or_known_default()
        .ok_or_else(|| StorageError::InvalidUrl(format!("no port for {signed_url}")))?;

    Ok(format!("http://{LOCAL_HOST}:{port}{}", &url[Position::BeforePath..]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    #[rstest]
    #[case(
        "http://localstack:4566/photos/cat.png?X-Amz-Expires=3600&X-Amz-Signature=ab",
        "http://localhost:4566/photos/cat.png?X-Amz-Expires=3600&X-Amz-Signature=ab"
    )]
    #[case("http://minio:9000/photos", "http://localhost:9000/photos")]
    #[case("https://storage.internal/photos", "http://localhost:443/photos")]
    #[case("http://127.0.0.1:8333/b/k%20x.jpg", "http://localhost:8333/b/k%20x.jpg")]
    fn test_rewrite_to_localhost(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(rewrite_to_localhost(input).unwrap(), expected);
    }

    #[test]
    fn test_rewrite_rejects_garbage() {
        assert!(matches!(
            rewrite_to_localhost("not a url"),
            Err(StorageError::InvalidUrl(_))
        ));
    }

    proptest! {
        #[test]
        fn prop_rewrite_preserves_port_and_path(
            host in "[a-z]{1,12}",
            port in 1u16..=u16::MAX,
            path in "/[a-z0-9]{1,16}",
        ) {
            let input = format!("http://{host}:{port}{path}?X-Amz-Expires=3600");
            let output = rewrite_to_localhost(&input).unwrap();

            // Default ports are elided by the parser but restored on output.
            prop_assert_eq!(
                output,
                format!("http://localhost:{port}{path}?X-Amz-Expires=3600")
            );
        }
    }
}
