use clap::ValueEnum;
use log::debug;
use phylotree::tree::Tree;
use std::collections::HashMap;
use std::fs;
use std::io::{self, Write};
use std::path::Path;

use flate2::write::GzEncoder;
use flate2::Compression;

use crate::error::{CompareError, Result};

/// Serialization of a tree file.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum TreeFormat {
    /// NEXUS for `.nexus`/`.nex`/`.trees` files or `#NEXUS` content, Newick otherwise
    #[default]
    Auto,
    /// A single bracketed tree terminated by `;`
    Newick,
    /// A NEXUS container holding a trees block
    Nexus,
}

impl TreeFormat {
    /// Resolve `Auto` from the file name and content.
    pub fn resolve(self, path: &Path, content: &str) -> TreeFormat {
        match self {
            TreeFormat::Auto => {
                let by_extension = path
                    .extension()
                    .and_then(|s| s.to_str())
                    .map(|ext| ext.to_ascii_lowercase())
                    .is_some_and(|ext| matches!(ext.as_str(), "nexus" | "nex" | "trees"));
                let by_content = content
                    .trim_start()
                    .get(..6)
                    .is_some_and(|head| head.eq_ignore_ascii_case("#NEXUS"));
                if by_extension || by_content {
                    TreeFormat::Nexus
                } else {
                    TreeFormat::Newick
                }
            }
            other => other,
        }
    }
}

/// Remove `[...]` comments, including BEAST annotations such as `[&rate=0.1]`.
///
/// BEAST writes `A:[&rate=0.123]2.45`; the branch length is what follows the
/// annotation, so dropping the bracketed text leaves `A:2.45`.
/// An unterminated `[` swallows the rest of the text.
pub fn strip_comments(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut in_comment = false;

    for ch in text.chars() {
        match ch {
            '[' if !in_comment => in_comment = true,
            ']' if in_comment => in_comment = false,
            _ if !in_comment => result.push(ch),
            _ => {}
        }
    }

    result
}

/// Remove whitespace outside quoted labels.
///
/// Leading whitespace or a newline before the root clade would otherwise fail
/// the single-tree check. `phylotree` itself drops whitespace from every label,
/// quoted or not, so quoted spaces kept here do not survive parsing.
pub fn strip_whitespace(newick: &str) -> String {
    let mut result = String::with_capacity(newick.len());
    let mut quote: Option<char> = None;

    for ch in newick.chars() {
        match quote {
            Some(q) if ch == q => quote = None,
            None if ch == '\'' || ch == '"' => quote = Some(ch),
            None if ch.is_whitespace() => continue,
            _ => {}
        }
        result.push(ch);
    }

    result
}

/// Reject text that would not form a single rooted tree.
///
/// Checks the opening bracket and that nothing but a root label/length follows
/// the closing bracket of the root clade.
fn check_single_tree(newick: &str) -> std::result::Result<(), String> {
    if !newick.starts_with('(') {
        return Err(match newick.chars().next() {
            Some(ch) => format!("expected '(' at the start of the tree, found '{ch}'"),
            None => "empty tree".to_string(),
        });
    }

    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    for (pos, ch) in newick.char_indices() {
        match (quote, ch) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '\'' | '"') => quote = Some(ch),
            (None, ';') => return Ok(()),
            (None, '(') if depth == 0 && pos > 0 => {
                return Err(format!("unexpected '(' after the root clade at offset {pos}"));
            }
            (None, '(') => depth += 1,
            (None, ')') if depth == 0 => return Err(format!("unbalanced ')' at offset {pos}")),
            (None, ')') => depth -= 1,
            (None, ',') if depth == 0 => {
                return Err(format!("unexpected ',' after the root clade at offset {pos}"));
            }
            _ => {}
        }
    }

    Ok(())
}

/// Parse a Newick string (comments and whitespace already removed).
pub fn parse_newick(newick: &str, path: &Path) -> Result<Tree> {
    let parse_error = |reason: String| CompareError::TreeParse {
        path: path.to_path_buf(),
        reason,
    };

    check_single_tree(newick).map_err(parse_error)?;
    Tree::from_newick(newick).map_err(|e| parse_error(e.to_string()))
}

/// Body of the NEXUS block holding the trees.
///
/// The block starts after the last `Begin trees` line, or the last `Begin ...`
/// line of any kind when there is none, and runs up to the first `End;` line
/// after it. Markers are matched case-insensitively, so trailing blocks such as
/// FigTree's `begin figtree;` are skipped.
pub fn extract_tree_block<'a>(content: &'a str, path: &Path) -> Result<Vec<&'a str>> {
    let lines: Vec<&str> = content.lines().collect();
    let missing = |marker| CompareError::MissingBlock { path: path.to_path_buf(), marker };
    let last_begin = |prefix: &str| {
        lines
            .iter()
            .rposition(|line| line.trim_start().to_ascii_uppercase().starts_with(prefix))
    };

    let start = last_begin("BEGIN TREES")
        .or_else(|| last_begin("BEGIN "))
        .ok_or_else(|| missing("Begin"))?;

    let end = lines[start + 1..]
        .iter()
        .position(|line| line.trim_start().to_ascii_uppercase().starts_with("END;"))
        .map(|offset| start + 1 + offset)
        .ok_or_else(|| missing("End;"))?;

    Ok(lines[start + 1..end].to_vec())
}

/// TRANSLATE table of a trees block: taxon id → label.
///
/// ```text
/// Translate
///     1 '1959.M.CD.59.ZR59',
///     2 '1960.DRC60A'
/// ;
/// ```
pub fn parse_taxon_block(block: &[&str]) -> HashMap<String, String> {
    let mut taxons = HashMap::new();
    let mut lines = block
        .iter()
        .map(|line| line.trim())
        .skip_while(|line| !line.to_ascii_uppercase().starts_with("TRANSLATE"));

    let Some(first) = lines.next() else {
        return taxons;
    };

    // Entries may start on the TRANSLATE line itself
    let first = first["TRANSLATE".len()..].trim();
    for line in std::iter::once(first).chain(lines) {
        let done = line.ends_with(';');
        for entry in line.trim_end_matches(';').split(',') {
            let mut parts = entry.split_whitespace();
            if let (Some(id), Some(label)) = (parts.next(), parts.next()) {
                taxons.insert(id.to_string(), label.trim_matches('\'').to_string());
            }
        }
        if done {
            break;
        }
    }

    taxons
}

/// Replace leaf labels by their TRANSLATE names. Unknown labels are kept.
pub fn rename_leaf_nodes(phylo_tree: &mut Tree, translate: &HashMap<String, String>) {
    for leaf_id in phylo_tree.get_leaves() {
        if let Ok(node) = phylo_tree.get_mut(&leaf_id) {
            if let Some(label) = node.name.as_ref().and_then(|n| translate.get(n)) {
                node.name = Some(label.clone());
            }
        }
    }
}

/// Tree text of a NEXUS file, plus its TRANSLATE table.
///
/// Comments are removed from the block, then everything up to and including the
/// first `=` is dropped. Only the first tree after that is parsed.
pub fn nexus_tree_text(content: &str, path: &Path) -> Result<(String, HashMap<String, String>)> {
    let block = extract_tree_block(content, path)?.join("\n");
    let block = strip_comments(&block);
    let block_lines: Vec<&str> = block.lines().collect();
    let translate = parse_taxon_block(&block_lines);

    let eq = block.find('=').ok_or_else(|| CompareError::TreeParse {
        path: path.to_path_buf(),
        reason: "no '=' introducing a tree in the trees block".to_string(),
    })?;

    Ok((block[eq + 1..].to_string(), translate))
}

/// Read a single tree from a Newick or NEXUS file.
///
/// With `use_real_taxa`, leaves of a NEXUS tree are relabelled through the
/// block's TRANSLATE table when one is present.
pub fn read_tree<P: AsRef<Path>>(
    path: P,
    format: TreeFormat,
    use_real_taxa: bool,
) -> Result<Tree> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| CompareError::io(path, e))?;

    let format = format.resolve(path, &content);
    debug!("Reading {:?} as {:?}", path, format);

    let (text, translate) = match format {
        TreeFormat::Nexus => nexus_tree_text(&content, path)?,
        _ => (strip_comments(&content), HashMap::new()),
    };

    let mut tree = parse_newick(&strip_whitespace(&text), path)?;

    if use_real_taxa && !translate.is_empty() {
        debug!("Translating {} taxon ids", translate.len());
        rename_leaf_nodes(&mut tree, &translate);
    }

    Ok(tree)
}

/// Write a header and rows as TSV to a file or stdout.
/// If `path` ends with `.gz`, the output is gzip-compressed.
/// If `path` equals `-`, the table is written to stdout (uncompressed).
pub fn write_tsv<P: AsRef<Path>, T: std::fmt::Display>(
    path: P,
    header: &[&str],
    rows: &[Vec<T>],
) -> io::Result<()> {
    use std::fs::File;
    use std::io::BufWriter;

    let p = path.as_ref();
    let is_gz = p.to_string_lossy().ends_with(".gz");

    let mut out: Box<dyn Write> = if p.as_os_str() == "-" {
        Box::new(BufWriter::new(io::stdout().lock()))
    } else if is_gz {
        let f = File::create(p)?;
        let enc = GzEncoder::new(f, Compression::default());
        Box::new(BufWriter::new(enc))
    } else {
        Box::new(BufWriter::new(File::create(p)?))
    };

    writeln!(&mut out, "{}", header.join("\t"))?;

    for row in rows {
        for (k, val) in row.iter().enumerate() {
            if k > 0 { write!(&mut out, "\t")?; }
            write!(&mut out, "{}", val)?;
        }
        writeln!(&mut out)?;
    }

    out.flush()?;
    Ok(())
}
