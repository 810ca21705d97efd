//! Staff — projects a pattern's notation onto a row of fixed-width cells.

use crate::rhythm::NotationNote;

/// A cell on the staff row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StaffCell {
    Empty,
    /// A note starts here.
    Onset,
    /// A note that was already played starts here.
    Played,
    /// A note is still sounding.
    Hold,
    /// Input cursor position.
    Cursor,
}

impl StaffCell {
    /// Character drawn for this cell.
    pub fn glyph(self) -> char {
        match self {
            Self::Empty => '·',
            Self::Onset => '●',
            Self::Played => '◉',
            Self::Hold => '─',
            Self::Cursor => '▲',
        }
    }
}

/// Project notation onto `steps` cells.
///
/// `played[i]` marks note `i` as already matched; a shorter slice leaves the
/// rest unplayed. `cursor` is a position in the pattern, 0.0 to 1.0.
pub fn project_notation(
    notes: &[NotationNote],
    steps: usize,
    played: &[bool],
    cursor: Option<f64>,
) -> Vec<StaffCell> {
    let mut cells = vec![StaffCell::Empty; steps];
    if steps == 0 {
        return cells;
    }
    let to_step = |fraction: f64| (fraction * steps as f64).floor().max(0.0) as usize;

    for (i, note) in notes.iter().enumerate() {
        let start = to_step(note.offset);
        if start >= steps {
            continue;
        }
        let end = to_step(note.offset + note.duration).min(steps);
        for cell in cells.iter_mut().take(end).skip(start + 1) {
            *cell = StaffCell::Hold;
        }
        cells[start] = if played.get(i).copied().unwrap_or(false) {
            StaffCell::Played
        } else {
            StaffCell::Onset
        };
    }

    if let Some(cursor) = cursor {
        let step = to_step(cursor);
        if step < steps && matches!(cells[step], StaffCell::Empty | StaffCell::Hold) {
            cells[step] = StaffCell::Cursor;
        }
    }
    cells
}

/// Render cells as a string of glyphs.
pub fn render_row(cells: &[StaffCell]) -> String {
    cells.iter().map(|c| c.glyph()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rhythm::DurationSymbol;

    fn note(offset: f64, duration: f64, kind: &str) -> NotationNote {
        NotationNote {
            offset,
            duration,
            kind: DurationSymbol::new(kind),
        }
    }

    #[test]
    fn quarters_fill_a_sixteen_step_row() {
        let notes: Vec<_> = (0..4).map(|i| note(i as f64 * 0.25, 0.25, "q")).collect();
        let cells = project_notation(&notes, 16, &[], None);
        assert_eq!(render_row(&cells), "●───●───●───●───");
    }

    #[test]
    fn played_notes_are_marked() {
        let notes = vec![note(0.0, 0.5, "h"), note(0.5, 0.5, "h")];
        let cells = project_notation(&notes, 8, &[true], None);
        assert_eq!(render_row(&cells), "◉───●───");
    }

    #[test]
    fn cursor_never_hides_an_onset() {
        let notes = vec![note(0.0, 0.25, "q"), note(0.5, 0.25, "q")];
        let cells = project_notation(&notes, 8, &[], Some(0.25));
        assert_eq!(cells[2], StaffCell::Cursor);
        let cells = project_notation(&notes, 8, &[], Some(0.5));
        assert_eq!(cells[4], StaffCell::Onset);
    }

    #[test]
    fn empty_inputs() {
        assert!(project_notation(&[note(0.0, 1.0, "w")], 0, &[], None).is_empty());
        let cells = project_notation(&[], 4, &[], Some(2.0));
        assert_eq!(render_row(&cells), "····");
    }
}
