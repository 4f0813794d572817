//! Calendar locations and fetching.

use std::path::PathBuf;

use reqwest::Url;
use tokio::task::JoinSet;

use crate::{CalendarError, DEFAULT_TIMEOUT};

/// Where a calendar is read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    /// A local file.
    Path(PathBuf),
    /// A remote calendar fetched over HTTP(S).
    Url(Url),
}

impl Source {
    /// Parses a location: anything containing `://` is a URL, everything
    /// else a local path. `file://` URLs become local paths.
    pub fn parse(location: &str) -> Result<Self, CalendarError> {
        let invalid = |reason| CalendarError::InvalidLocation {
            location: location.to_string(),
            reason,
        };

        if !location.contains("://") {
            return Ok(Self::Path(PathBuf::from(location)));
        }

        let url = Url::parse(location).map_err(|_| invalid("malformed URL"))?;
        match url.scheme() {
            "file" => url
                .to_file_path()
                .map(Self::Path)
                .map_err(|()| invalid("file URL is not an absolute path")),
            "http" | "https" => Ok(Self::Url(url)),
            _ => Err(invalid("unsupported URL scheme")),
        }
    }

    async fn read(
        self,
        location: String,
        client: reqwest::Client,
    ) -> Result<String, CalendarError> {
        match self {
            Self::Path(path) => tokio::fs::read_to_string(&path)
                .await
                .map_err(|source| CalendarError::Read { location, source }),
            Self::Url(url) => {
                tracing::debug!(%url, "fetching calendar");
                let response = match client.get(url).send().await {
                    Ok(response) => response,
                    Err(source) => return Err(CalendarError::Fetch { location, source }),
                };

                let status = response.status();
                if !status.is_success() {
                    return Err(CalendarError::Status { location, status });
                }

                response
                    .text()
                    .await
                    .map_err(|source| CalendarError::Fetch { location, source })
            }
        }
    }
}

/// Reads every location concurrently.
///
/// Returns `(location, body)` pairs in the order the locations were given.
pub(crate) fn fetch_all(locations: &[String]) -> Result<Vec<(String, String)>, CalendarError> {
    if locations.is_empty() {
        return Ok(Vec::new());
    }

    let sources = locations
        .iter()
        .map(|location| Source::parse(location))
        .collect::<Result<Vec<_>, _>>()?;

    let client = reqwest::Client::builder()
        .timeout(DEFAULT_TIMEOUT)
        .build()
        .map_err(CalendarError::ClientBuild)?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(CalendarError::Runtime)?;

    runtime.block_on(async move {
        let mut tasks = JoinSet::new();
        for (index, (source, location)) in sources.into_iter().zip(locations).enumerate() {
            let location = location.clone();
            let client = client.clone();
            tasks.spawn(async move {
                let body = source.read(location.clone(), client).await;
                (index, location, body)
            });
        }

        let mut documents = Vec::with_capacity(locations.len());
        while let Some(joined) = tasks.join_next().await {
            let (index, location, body) = joined?;
            documents.push((index, location, body?));
        }

        documents.sort_by_key(|(index, _, _)| *index);
        let documents: Vec<(String, String)> = documents
            .into_iter()
            .map(|(_, location, body)| (location, body))
            .collect();
        Ok::<_, CalendarError>(documents)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_locations_are_paths() {
        assert_eq!(
            Source::parse("cal/work.ics").unwrap(),
            Source::Path(PathBuf::from("cal/work.ics"))
        );
    }

    #[test]
    fn file_urls_are_paths() {
        assert_eq!(
            Source::parse("file:///home/me/work.ics").unwrap(),
            Source::Path(PathBuf::from("/home/me/work.ics"))
        );
    }

    #[test]
    fn http_urls_are_remote() {
        let source = Source::parse("https://example.com/team.ics").unwrap();
        assert!(matches!(source, Source::Url(url) if url.host_str() == Some("example.com")));
    }

    #[test]
    fn unsupported_schemes_are_rejected() {
        let err = Source::parse("ftp://example.com/team.ics").unwrap_err();
        assert!(matches!(
            err,
            CalendarError::InvalidLocation {
                reason: "unsupported URL scheme",
                ..
            }
        ));
    }
}
