//! Board extraction from rendered markup.
//!
//! The rendered page has three regions we read: the solar-date banner, the
//! lunar-date banner (which also carries the seed digit), and the grid of six
//! palace cells. Missing fields inside a region degrade to defaults; a
//! missing lunar banner or grid means the page is not a board and the whole
//! parse fails with [`BoardError::Parse`].

use crate::error::{BoardError, LiurenResult};
use crate::markup::{exists, try_extract, MarkupTree, ScraperTree};
use crate::types::{BoardResult, PalaceRecord};

/// Class selectors of the rendered board.
pub mod selectors {
    pub const SOLAR_BANNER: &str = ".yangli";
    pub const LUNAR_BANNER: &str = ".nongli";
    pub const BANNER_LABEL: &str = "span";
    pub const GRID: &str = ".grid";
    pub const CELL: &str = ".item";
    pub const POSITION: &str = ".gong";
    pub const DEITY: &str = ".shen";
    pub const RELATION: &str = ".qin";
    pub const STAR: &str = ".xing";
    pub const BRANCH: &str = ".zhi";
    pub const SEED_DIGIT: &str = ".ri span";
    pub const CURRENT: &str = ".shi";
}

const SOLAR_PREFIX: &str = "日期：";
const SEED_MARK: char = '数';
const DEFAULT_SEED_DIGIT: &str = "0";

/// Parse rendered HTML into a board.
pub fn parse(html: &str, url: &str) -> LiurenResult<BoardResult> {
    let tree = ScraperTree::parse(html);
    parse_tree(&tree, url)
}

/// Parse an already-built markup tree into a board.
///
/// Every failure comes back as [`BoardError::Parse`] carrying `url`.
pub fn parse_tree<T: MarkupTree>(tree: &T, url: &str) -> LiurenResult<BoardResult> {
    extract(tree, url).map_err(|e| {
        let error = match e {
            BoardError::Parse { error, .. } => error,
            other => other.to_string(),
        };
        tracing::warn!(%url, %error, "board extraction failed");
        BoardError::Parse {
            error,
            url: url.to_string(),
        }
    })
}

fn extract<T: MarkupTree>(tree: &T, url: &str) -> LiurenResult<BoardResult> {
    let root = tree.root();

    let solar_banner = solar_banner(tree, root)?;
    let (lunar_banner, seed_digit) = lunar_banner(tree, root)?;
    let mut palaces = palace_cells(tree, root)?;

    // sort_by_key is stable: unknown labels keep their page order.
    palaces.sort_by_key(PalaceRecord::rank);

    if palaces.len() != 6 {
        tracing::warn!(count = palaces.len(), "board grid did not have six cells");
    }
    tracing::debug!(
        palaces = palaces.len(),
        time_palace = palaces.iter().filter(|p| p.is_time_palace).count(),
        "parsed board"
    );

    Ok(BoardResult {
        solar_banner,
        lunar_banner,
        seed_digit,
        palaces,
        source_url: url.to_string(),
    })
}

fn structure(message: impl Into<String>) -> BoardError {
    BoardError::Parse {
        error: message.into(),
        url: String::new(),
    }
}

fn solar_banner<'a, T: MarkupTree>(tree: &'a T, root: T::Node<'a>) -> LiurenResult<String> {
    let Some(banner) = tree.select_one(root, selectors::SOLAR_BANNER)? else {
        return Ok(String::new());
    };

    let joined = tree
        .select_all(banner, selectors::BANNER_LABEL)?
        .into_iter()
        .map(|span| tree.text(span))
        .collect::<Vec<_>>()
        .join(" ");

    let trimmed = joined.trim();
    Ok(trimmed
        .strip_prefix(SOLAR_PREFIX)
        .unwrap_or(trimmed)
        .trim()
        .to_string())
}

/// Returns `(lunar banner, seed digit)`.
fn lunar_banner<'a, T: MarkupTree>(
    tree: &'a T,
    root: T::Node<'a>,
) -> LiurenResult<(String, String)> {
    let banner = tree
        .select_one(root, selectors::LUNAR_BANNER)?
        .ok_or_else(|| structure("lunar date banner (.nongli) not found"))?;

    let mut lunar = String::new();
    let mut seed: Option<String> = None;

    for span in tree.select_all(banner, selectors::BANNER_LABEL)? {
        let text = tree.text(span);
        if text.contains(SEED_MARK) {
            if seed.is_none() {
                seed = Some(text.replace(SEED_MARK, "").trim().to_string());
            }
        } else {
            lunar.push_str(&text);
        }
    }

    Ok((lunar, seed.unwrap_or_default()))
}

fn palace_cells<'a, T: MarkupTree>(
    tree: &'a T,
    root: T::Node<'a>,
) -> LiurenResult<Vec<PalaceRecord>> {
    let grid = tree
        .select_one(root, selectors::GRID)?
        .ok_or_else(|| structure("palace grid (.grid) not found"))?;

    let cells = tree.select_all(grid, selectors::CELL)?;
    if cells.is_empty() {
        return Err(structure("palace grid contains no cells"));
    }

    cells
        .into_iter()
        .map(|cell| palace_record(tree, cell))
        .collect()
}

fn palace_record<'a, T: MarkupTree>(tree: &'a T, cell: T::Node<'a>) -> LiurenResult<PalaceRecord> {
    let seed_digit = match tree.select_one(cell, selectors::SEED_DIGIT)? {
        Some(node) => tree.text(node).trim().to_string(),
        None => DEFAULT_SEED_DIGIT.to_string(),
    };

    Ok(PalaceRecord {
        position: try_extract(tree, cell, selectors::POSITION)?,
        deity: try_extract(tree, cell, selectors::DEITY)?,
        relation: try_extract(tree, cell, selectors::RELATION)?,
        star: try_extract(tree, cell, selectors::STAR)?,
        branch: try_extract(tree, cell, selectors::BRANCH)?,
        seed_digit,
        is_time_palace: exists(tree, cell, selectors::CURRENT)?,
    })
}
