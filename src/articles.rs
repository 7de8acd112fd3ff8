use std::fs;
use std::path::{Path, PathBuf};

use include_dir::{include_dir, Dir};
use itertools::Itertools;
use rand::Rng;
use serde::Deserialize;

use crate::error::{Error, Result};

static ARTICLE_DIR: Dir = include_dir!("$CARGO_MANIFEST_DIR/resources/articles");

#[derive(Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Article {
    pub title: String,
    pub text: String,
}

/// The passages bundled with the binary, ordered by resource file name.
#[derive(Clone, Debug)]
pub struct Catalogue {
    articles: Vec<Article>,
}

impl Catalogue {
    pub fn builtin() -> Result<Self> {
        let articles = ARTICLE_DIR
            .files()
            .filter(|f| f.path().extension().is_some_and(|ext| ext == "json"))
            .sorted_by(|a, b| a.path().cmp(b.path()))
            .map(|f| {
                let name = f.path().display().to_string();
                let contents = f
                    .contents_utf8()
                    .ok_or_else(|| Error::ArticleResource(name.clone()))?;
                serde_json::from_str::<Article>(contents)
                    .map_err(|source| Error::ArticleJson { name, source })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { articles })
    }

    pub fn from_articles(articles: Vec<Article>) -> Self {
        Self { articles }
    }

    pub fn len(&self) -> usize {
        self.articles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.articles.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Article> {
        self.articles.get(index)
    }

    pub fn titles(&self) -> impl Iterator<Item = &str> {
        self.articles.iter().map(|a| a.title.as_str())
    }

    /// Resolves a 1-based index or a case-insensitive title (exact match first,
    /// then the first title containing the query).
    pub fn find(&self, query: &str) -> Result<usize> {
        let query = query.trim();
        if let Ok(n) = query.parse::<usize>() {
            return (1..=self.len())
                .contains(&n)
                .then(|| n - 1)
                .ok_or_else(|| Error::UnknownArticle(query.to_string()));
        }

        let needle = query.to_lowercase();
        let titles = self
            .articles
            .iter()
            .map(|a| a.title.to_lowercase())
            .collect::<Vec<_>>();

        titles
            .iter()
            .position(|t| *t == needle)
            .or_else(|| titles.iter().position(|t| t.contains(&needle)))
            .ok_or_else(|| Error::UnknownArticle(query.to_string()))
    }

    pub fn random_index<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<usize> {
        (!self.is_empty()).then(|| rng.gen_range(0..self.len()))
    }
}

/// Where the passage being typed comes from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TextSource {
    Article(usize),
    Prompt(String),
    File { path: PathBuf, text: String },
}

impl TextSource {
    /// Loads a passage from disk. Line breaks become single spaces since the
    /// passage is rewrapped for display anyway.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let raw = fs::read_to_string(&path).map_err(|source| Error::Read {
            path: path.clone(),
            source,
        })?;
        let text = raw
            .lines()
            .map(str::trim_end)
            .filter(|l| !l.is_empty())
            .join(" ");
        Ok(Self::File { path, text })
    }

    pub fn text<'a>(&'a self, catalogue: &'a Catalogue) -> &'a str {
        match self {
            Self::Article(index) => catalogue
                .get(*index)
                .map(|a| a.text.as_str())
                .unwrap_or_default(),
            Self::Prompt(text) => text.as_str(),
            Self::File { text, .. } => text.as_str(),
        }
    }

    pub fn label(&self, catalogue: &Catalogue) -> String {
        match self {
            Self::Article(index) => catalogue
                .get(*index)
                .map(|a| a.title.clone())
                .unwrap_or_default(),
            Self::Prompt(_) => "custom prompt".to_string(),
            Self::File { path, .. } => path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string()),
        }
    }
}
