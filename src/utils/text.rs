//! Sentence-aware text chunking for retrieval.

pub const DEFAULT_CHUNK_SIZE: usize = 1000;
pub const DEFAULT_CHUNK_OVERLAP: usize = 200;

/// Splits `text` into windows of at most `chunk_size` characters, each
/// starting with up to `chunk_overlap` characters of trailing sentences from
/// the previous window. Sentences longer than a window are cut by characters.
pub fn chunk_text(text: &str, chunk_size: usize, chunk_overlap: usize) -> Vec<String> {
    if text.trim().is_empty() || chunk_size == 0 {
        return Vec::new();
    }

    let pieces: Vec<String> = split_sentences(text)
        .into_iter()
        .flat_map(|s| split_chars(&s, chunk_size))
        .collect();

    merge_pieces(&pieces, chunk_size, chunk_overlap.min(chunk_size / 2))
        .into_iter()
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
        .collect()
}

fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut current = String::new();
    let chars: Vec<char> = text.chars().collect();
    let mut i = 0;

    while i < chars.len() {
        current.push(chars[i]);

        // Paragraph break
        if chars[i] == '\n' && chars.get(i + 1) == Some(&'\n') {
            current.push('\n');
            i += 1;
            if !current.trim().is_empty() {
                sentences.push(std::mem::take(&mut current));
            }
        } else if matches!(chars[i], '.' | '?' | '!')
            && chars.get(i + 1) == Some(&' ')
            && !current.trim().is_empty()
        {
            sentences.push(std::mem::take(&mut current));
        }

        i += 1;
    }

    if !current.trim().is_empty() {
        sentences.push(current);
    }
    sentences
}

fn split_chars(piece: &str, max: usize) -> Vec<String> {
    let chars: Vec<char> = piece.chars().collect();
    if chars.len() <= max {
        return vec![piece.to_string()];
    }
    chars.chunks(max).map(|c| c.iter().collect()).collect()
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

fn merge_pieces(pieces: &[String], chunk_size: usize, chunk_overlap: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;
    let mut window_start = 0;

    for (idx, piece) in pieces.iter().enumerate() {
        let piece_len = char_len(piece);
        if !current.is_empty() && current_len + piece_len > chunk_size {
            chunks.push(std::mem::take(&mut current));

            // Carry trailing pieces forward, as long as the next piece still fits.
            let mut overlap_len = 0;
            let mut overlap_start = idx;
            for i in (window_start..idx).rev() {
                let len = char_len(&pieces[i]);
                if overlap_len + len > chunk_overlap || overlap_len + len + piece_len > chunk_size {
                    break;
                }
                overlap_len += len;
                overlap_start = i;
            }
            for p in &pieces[overlap_start..idx] {
                current.push_str(p);
            }
            current_len = overlap_len;
            window_start = overlap_start;
        }

        current.push_str(piece);
        current_len += piece_len;
    }

    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}
