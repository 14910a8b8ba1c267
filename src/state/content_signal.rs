use crate::crawler::PageSignals;
use crate::state::FetchStatus;

/// The evidence gathered for one URL
///
/// Created once by the fetcher and never mutated afterwards. Text fields are
/// `None` when the page had no such element or the fetch did not succeed.
#[derive(Debug, Clone, PartialEq)]
pub struct ContentSignal {
    pub url: String,
    pub title: Option<String>,
    pub heading: Option<String>,
    pub description: Option<String>,
    pub excerpt: Option<String>,
    pub status: FetchStatus,
    pub error_detail: Option<String>,
}

impl ContentSignal {
    /// A successfully fetched page and the signals extracted from it
    pub fn success(url: impl Into<String>, page: PageSignals) -> Self {
        Self {
            url: url.into(),
            title: page.title,
            heading: page.heading,
            description: page.description,
            excerpt: page.excerpt,
            status: FetchStatus::Success,
            error_detail: None,
        }
    }

    /// A page that could not be fetched
    pub fn failed(url: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::without_content(url, FetchStatus::Failed, detail)
    }

    /// A page guarded by an authorization challenge
    pub fn auth_required(url: impl Into<String>, status_code: u16) -> Self {
        Self::without_content(
            url,
            FetchStatus::AuthRequired,
            format!("Authentication required (HTTP {})", status_code),
        )
    }

    fn without_content(url: impl Into<String>, status: FetchStatus, detail: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: None,
            heading: None,
            description: None,
            excerpt: None,
            status,
            error_detail: Some(detail.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }
}
