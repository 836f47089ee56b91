//! Narrow tree-query capability over rendered markup.
//!
//! The board parser only ever needs three operations: find the first match
//! below a node, find every match below a node, and read a node's text.
//! [`ScraperTree`] backs them with the `scraper` crate.

use scraper::{ElementRef, Html, Selector};

use crate::error::{BoardError, LiurenResult};

/// Read-only query access to a parsed document.
pub trait MarkupTree {
    type Node<'a>: Copy
    where
        Self: 'a;

    /// The document element all queries start from.
    fn root(&self) -> Self::Node<'_>;

    /// First descendant of `scope` matching `selector`.
    fn select_one<'a>(
        &'a self,
        scope: Self::Node<'a>,
        selector: &str,
    ) -> LiurenResult<Option<Self::Node<'a>>>;

    /// Every descendant of `scope` matching `selector`, in document order.
    fn select_all<'a>(
        &'a self,
        scope: Self::Node<'a>,
        selector: &str,
    ) -> LiurenResult<Vec<Self::Node<'a>>>;

    /// Concatenated text content of `node` and its descendants.
    fn text<'a>(&'a self, node: Self::Node<'a>) -> String;
}

/// Trimmed text of the first match, or `""` when nothing matches.
pub fn try_extract<'a, T: MarkupTree>(
    tree: &'a T,
    scope: T::Node<'a>,
    selector: &str,
) -> LiurenResult<String> {
    Ok(tree
        .select_one(scope, selector)?
        .map(|node| tree.text(node).trim().to_string())
        .unwrap_or_default())
}

/// Whether anything below `scope` matches `selector`.
pub fn exists<'a, T: MarkupTree>(
    tree: &'a T,
    scope: T::Node<'a>,
    selector: &str,
) -> LiurenResult<bool> {
    Ok(tree.select_one(scope, selector)?.is_some())
}

/// [`MarkupTree`] over an HTML document parsed by `scraper`.
pub struct ScraperTree {
    document: Html,
}

impl ScraperTree {
    pub fn parse(html: &str) -> Self {
        Self {
            document: Html::parse_document(html),
        }
    }
}

fn compile(selector: &str) -> LiurenResult<Selector> {
    Selector::parse(selector).map_err(|e| BoardError::InvalidSelector(format!("{selector}: {e:?}")))
}

impl MarkupTree for ScraperTree {
    type Node<'a> = ElementRef<'a>;

    fn root(&self) -> ElementRef<'_> {
        self.document.root_element()
    }

    fn select_one<'a>(
        &'a self,
        scope: ElementRef<'a>,
        selector: &str,
    ) -> LiurenResult<Option<ElementRef<'a>>> {
        let sel = compile(selector)?;
        Ok(scope.select(&sel).next())
    }

    fn select_all<'a>(
        &'a self,
        scope: ElementRef<'a>,
        selector: &str,
    ) -> LiurenResult<Vec<ElementRef<'a>>> {
        let sel = compile(selector)?;
        Ok(scope.select(&sel).collect())
    }

    fn text<'a>(&'a self, node: ElementRef<'a>) -> String {
        node.text().collect()
    }
}
