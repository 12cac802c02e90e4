//! Blank-line framed sentence reading and writing

use super::error::{CorpusError, CorpusResult};
use super::format::Sentence;
use crate::logging::codes;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/// Read every sentence from `reader`; `#` lines are comments
pub fn read_sentences<R: BufRead>(reader: R) -> CorpusResult<Vec<Sentence>> {
    let mut sentences = Vec::new();
    let mut current = Sentence::new();

    for (index, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| CorpusError::io("<reader>", e))?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            if !current.is_empty() {
                sentences.push(std::mem::take(&mut current));
            }
            continue;
        }
        if trimmed.starts_with('#') {
            continue;
        }
        current.push_line(trimmed, index + 1)?;
    }
    if !current.is_empty() {
        sentences.push(current);
    }
    Ok(sentences)
}

pub fn read_file(path: &Path) -> CorpusResult<Vec<Sentence>> {
    let file = File::open(path).map_err(|e| CorpusError::io(path.display(), e))?;
    let sentences = read_sentences(BufReader::new(file)).map_err(|e| match e {
        CorpusError::Io { error, .. } => CorpusError::io(path.display(), error),
        other => other,
    })?;
    if sentences.is_empty() {
        return Err(CorpusError::EmptyCorpus {
            path: path.display().to_string(),
        });
    }

    crate::log_success!(codes::success::CORPUS_READ, "Corpus read",
        "path" => path.display(),
        "sentences" => sentences.len()
    );
    Ok(sentences)
}

/// Write sentences, each followed by a blank line
pub fn write_sentences<W: Write>(writer: &mut W, sentences: &[Sentence]) -> std::io::Result<()> {
    for sentence in sentences {
        for line in sentence.lines() {
            writeln!(writer, "{}", line)?;
        }
        writeln!(writer)?;
    }
    writer.flush()
}

pub fn write_file(path: &Path, sentences: &[Sentence]) -> CorpusResult<()> {
    let file = File::create(path).map_err(|e| CorpusError::io(path.display(), e))?;
    let mut writer = BufWriter::new(file);
    write_sentences(&mut writer, sentences).map_err(|e| CorpusError::io(path.display(), e))?;

    crate::log_success!(codes::success::CORPUS_WRITTEN, "Corpus written",
        "path" => path.display(),
        "sentences" => sentences.len()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::io::Cursor;
    use tempfile::tempdir;

    const TWO_SENTENCES: &str = "# sent 1\n\
        1\tJohn\t_\tN\tNNP\t_\t2\tSBJ\t_\t_\n\
        2\tsleeps\t_\tV\tVBZ\t_\t0\tROOT\t_\t_\n\
        \n\n\
        1\tGo\t_\tV\tVB\t_\t0\tROOT\t_\t_\n";

    #[test]
    fn test_read_skips_comments_and_extra_blank_lines() {
        let sentences = read_sentences(Cursor::new(TWO_SENTENCES)).unwrap();
        assert_eq!(sentences.len(), 2);
        assert_eq!(sentences[0].len(), 2);
        assert_eq!(sentences[1].value(1, 1), Some("Go"));
    }

    #[test]
    fn test_file_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("corpus.conll");
        let sentences = read_sentences(Cursor::new(TWO_SENTENCES)).unwrap();

        write_file(&path, &sentences).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.ends_with("ROOT\t_\t_\n\n"));
        assert_eq!(read_file(&path).unwrap(), sentences);
    }

    #[test]
    fn test_empty_and_missing_files() {
        let dir = tempdir().unwrap();
        let empty = dir.path().join("empty.conll");
        std::fs::write(&empty, "\n\n# nothing\n").unwrap();

        assert_matches!(read_file(&empty), Err(CorpusError::EmptyCorpus { .. }));
        assert_matches!(
            read_file(&dir.path().join("missing.conll")),
            Err(CorpusError::Io { .. })
        );
    }
}
