//! Labeled example and NLP parse files
//!
//! Layout:
//!
//! ```text
//! questions.json              [{ "iIndex", "sQuestion", "lEquations", "lSolutions" }, ...]
//! parses/question-<i>.json    { "sentences": [...] }
//! ```

use super::{LoadError, LoadResult};
use crate::problem::{Document, LabeledExample, WordProblem};
use crate::template::Template;
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

/// File name of the NLP parse of problem `index`
pub fn parse_file_name(index: u32) -> String {
    format!("question-{}.json", index)
}

fn read_json<T: DeserializeOwned>(path: &Path) -> LoadResult<T> {
    let contents = fs::read_to_string(path)
        .map_err(|e| LoadError::FileNotFound(format!("{}: {}", path.display(), e)))?;

    serde_json::from_str(&contents)
        .map_err(|e| LoadError::ParseError(format!("{}: {}", path.display(), e)))
}

/// Load labeled examples keyed by index
pub fn load_examples<P: AsRef<Path>>(path: P) -> LoadResult<BTreeMap<u32, LabeledExample>> {
    let path = path.as_ref();
    let examples: Vec<LabeledExample> = read_json(path)?;

    let mut by_index = BTreeMap::new();
    for example in examples {
        let index = example.index;
        if by_index.insert(index, example).is_some() {
            return Err(LoadError::InvalidFormat(format!(
                "{}: duplicate iIndex {}",
                path.display(),
                index
            )));
        }
    }

    debug!(path = %path.display(), examples = by_index.len(), "loaded labeled examples");
    Ok(by_index)
}

/// Load the NLP document of problem `index` from `dir`
pub fn load_document<P: AsRef<Path>>(dir: P, index: u32) -> LoadResult<Document> {
    read_json(&dir.as_ref().join(parse_file_name(index)))
}

/// Load one word problem
pub fn load_word_problem<P: AsRef<Path>, Q: AsRef<Path>>(
    examples_path: P,
    parse_dir: Q,
    index: u32,
) -> LoadResult<WordProblem> {
    let mut examples = load_examples(examples_path)?;
    let example = examples.remove(&index).ok_or(LoadError::MissingExample(index))?;
    let document = load_document(parse_dir, index)?;
    Ok(WordProblem::new(example, document))
}

/// Load every word problem whose parse can be read
///
/// Problems with a missing or malformed parse are skipped with a warning.
pub fn load_word_problems<P: AsRef<Path>, Q: AsRef<Path>>(
    examples_path: P,
    parse_dir: Q,
) -> LoadResult<Vec<WordProblem>> {
    let parse_dir = parse_dir.as_ref();

    if !parse_dir.is_dir() {
        return Err(LoadError::FileNotFound(format!(
            "{} is not a directory",
            parse_dir.display()
        )));
    }

    let examples = load_examples(examples_path)?;
    let total = examples.len();
    let mut problems = Vec::with_capacity(total);

    for (index, example) in examples {
        match load_document(parse_dir, index) {
            Ok(document) => problems.push(WordProblem::new(example, document)),
            Err(e) => warn!(problem = index, error = %e, "skipping problem"),
        }
    }

    debug!(loaded = problems.len(), total, "loaded word problems");
    Ok(problems)
}

/// Load persisted templates (a JSON list of template records)
pub fn load_templates<P: AsRef<Path>>(path: P) -> LoadResult<Vec<Template>> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)
        .map_err(|e| LoadError::FileNotFound(format!("{}: {}", path.display(), e)))?;

    // Records that parse as JSON but fail template validation are data errors
    serde_json::from_str(&contents).map_err(|e| {
        let msg = format!("{}: {}", path.display(), e);
        if e.is_data() {
            LoadError::InvalidFormat(msg)
        } else {
            LoadError::ParseError(msg)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const EXAMPLES: &str = r#"[
        {"iIndex": 1, "sQuestion": "Tom has 3 apples and gets 5 more.", "lEquations": ["x = 3 + 5"], "lSolutions": [8.0]},
        {"iIndex": 2, "sQuestion": "Missing parse.", "lEquations": ["x = 1"], "lSolutions": [1.0]}
    ]"#;

    const DOCUMENT: &str = r#"{"sentences": [{"tokens": [
        {"word": "Tom", "lemma": "Tom", "pos": "NNP"},
        {"word": "has", "lemma": "have", "pos": "VBZ"},
        {"word": "3", "lemma": "3", "pos": "CD"},
        {"word": "apples", "lemma": "apple", "pos": "NNS"},
        {"word": "5", "lemma": "5", "pos": "CD"}
    ]}]}"#;

    #[test]
    fn test_parse_file_name() {
        assert_eq!(parse_file_name(2598), "question-2598.json");
    }

    #[test]
    fn test_load_dataset() {
        let dir = tempdir().unwrap();
        let questions = dir.path().join("questions.json");
        let parses = dir.path().join("parses");
        fs::create_dir_all(&parses).unwrap();
        fs::write(&questions, EXAMPLES).unwrap();
        fs::write(parses.join(parse_file_name(1)), DOCUMENT).unwrap();

        let examples = load_examples(&questions).unwrap();
        assert_eq!(examples.len(), 2);

        let problem = load_word_problem(&questions, &parses, 1).unwrap();
        assert_eq!(problem.numbers().len(), 2);

        assert_eq!(
            load_word_problem(&questions, &parses, 9).unwrap_err(),
            LoadError::MissingExample(9)
        );
        assert!(matches!(
            load_word_problem(&questions, &parses, 2),
            Err(LoadError::FileNotFound(_))
        ));

        let problems = load_word_problems(&questions, &parses).unwrap();
        assert_eq!(problems.len(), 1);
        assert_eq!(problems[0].index(), 1);
    }

    #[test]
    fn test_duplicate_index_is_invalid() {
        let dir = tempdir().unwrap();
        let questions = dir.path().join("questions.json");
        fs::write(
            &questions,
            r#"[{"iIndex": 1, "sQuestion": "", "lEquations": []},
                {"iIndex": 1, "sQuestion": "", "lEquations": []}]"#,
        )
        .unwrap();
        assert!(matches!(load_examples(&questions), Err(LoadError::InvalidFormat(_))));
    }

    #[test]
    fn test_malformed_json() {
        let dir = tempdir().unwrap();
        let questions = dir.path().join("questions.json");
        fs::write(&questions, "{not json").unwrap();
        assert!(matches!(load_examples(&questions), Err(LoadError::ParseError(_))));
        assert!(matches!(
            load_examples(dir.path().join("absent.json")),
            Err(LoadError::FileNotFound(_))
        ));
    }

    #[test]
    fn test_load_templates() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("templates.json");
        fs::write(
            &path,
            r#"[{"equations": ["u_0_0 + n_0 = n_1"], "solution": {"u_0": "n_1 - n_0"}}]"#,
        )
        .unwrap();
        let templates = load_templates(&path).unwrap();
        assert_eq!(templates.len(), 1);
        assert!(templates[0].solution().is_some());

        fs::write(
            &path,
            r#"[{"equations": ["u_0_0 + n_0 = n_1"], "solution": {"u_0": "n_1 - x"}}]"#,
        )
        .unwrap();
        assert!(matches!(load_templates(&path), Err(LoadError::InvalidFormat(_))));
    }
}
