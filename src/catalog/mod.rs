//! Runtime catalog: the selectable (language, version) list fetched from the service.

use crate::piston::{ClientError, PistonClient, Runtime};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageOption {
    /// Position in the fetched listing; only stable within one fetch.
    pub id: usize,
    pub language: String,
    pub version: String,
    pub aliases: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogStatus {
    Loading,
    Loaded,
    /// Last fetch failed; whatever was loaded before is kept.
    Unavailable(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    options: Vec<LanguageOption>,
}

impl Catalog {
    pub fn from_runtimes(runtimes: Vec<Runtime>) -> Self {
        let options = runtimes
            .into_iter()
            .enumerate()
            .map(|(id, rt)| LanguageOption {
                id,
                language: rt.language,
                version: rt.version,
                aliases: rt.aliases,
            })
            .collect();
        Self { options }
    }

    pub fn options(&self) -> &[LanguageOption] {
        &self.options
    }

    pub fn len(&self) -> usize {
        self.options.len()
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    /// Resolve a selection key against this listing.
    pub fn select(&self, id: usize) -> Option<&LanguageOption> {
        self.options.get(id)
    }

    /// Position of the first entry matching `language`/`version`, used to
    /// highlight the current selection in the picker.
    pub fn position_of(&self, language: &str, version: &str) -> Option<usize> {
        self.options
            .iter()
            .position(|o| o.language == language && o.version == version)
    }

    /// First entry whose language name or one of its aliases equals `name`.
    pub fn find_language(&self, name: &str) -> Option<&LanguageOption> {
        self.options
            .iter()
            .find(|o| o.language == name || o.aliases.iter().any(|a| a == name))
    }
}

/// Fetch the runtime listing once and turn it into a [`Catalog`].
pub async fn load(client: &PistonClient) -> Result<Catalog, ClientError> {
    match client.runtimes().await {
        Ok(runtimes) => {
            tracing::info!(count = runtimes.len(), "runtime catalog loaded");
            Ok(Catalog::from_runtimes(runtimes))
        }
        Err(e) => {
            tracing::warn!(error = %e, "runtime catalog unavailable");
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rt(language: &str, version: &str) -> Runtime {
        Runtime {
            language: language.into(),
            version: version.into(),
            aliases: Vec::new(),
        }
    }

    #[test]
    fn ids_follow_response_order() {
        let catalog = Catalog::from_runtimes(vec![
            rt("python", "3.10.0"),
            rt("python", "2.7.18"),
            rt("rust", "1.68.2"),
        ]);
        assert_eq!(catalog.len(), 3);
        let ids: Vec<usize> = catalog.options().iter().map(|o| o.id).collect();
        assert_eq!(ids, vec![0, 1, 2]);
        assert_eq!(catalog.options()[1].version, "2.7.18");
        assert_eq!(catalog.options()[2].language, "rust");
    }

    #[test]
    fn duplicate_languages_are_distinguished_by_id() {
        let catalog = Catalog::from_runtimes(vec![rt("python", "3.10.0"), rt("python", "2.7.18")]);
        assert_eq!(catalog.select(0).unwrap().version, "3.10.0");
        assert_eq!(catalog.select(1).unwrap().version, "2.7.18");
        assert_eq!(catalog.position_of("python", "2.7.18"), Some(1));
    }

    #[test]
    fn find_language_matches_aliases() {
        let mut node = rt("javascript", "20.11.1");
        node.aliases = vec!["js".into(), "node-javascript".into()];
        let catalog = Catalog::from_runtimes(vec![rt("python", "3.10.0"), node]);
        assert_eq!(catalog.find_language("js").map(|o| o.id), Some(1));
        assert_eq!(catalog.find_language("python").map(|o| o.id), Some(0));
        assert!(catalog.find_language("cobol").is_none());
    }

    #[test]
    fn out_of_range_selection_resolves_to_nothing() {
        let catalog = Catalog::from_runtimes(vec![rt("go", "1.16.2")]);
        assert!(catalog.select(1).is_none());
        assert!(Catalog::default().select(0).is_none());
    }

    #[tokio::test]
    async fn load_reports_transport_failure() {
        let client = PistonClient::with_client(reqwest::Client::new(), "http://127.0.0.1:1");
        assert!(load(&client).await.is_err());
    }
}
