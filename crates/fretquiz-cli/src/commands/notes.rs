//! The `fretquiz notes` command.

use anyhow::Result;
use comfy_table::{Cell, Table};
use fretquiz_core::note::{note_at, Fret, GuitarString};

pub fn execute(max_fret: u8) -> Result<()> {
    println!("{}", note_table(max_fret));
    Ok(())
}

/// Strings from high E down to low E, frets `0..=max_fret` across.
fn note_table(max_fret: u8) -> Table {
    let frets: Vec<Fret> = Fret::all().take_while(|f| f.value() <= max_fret).collect();

    let mut table = Table::new();
    let mut header = vec![Cell::new("String")];
    header.extend(frets.iter().map(|f| Cell::new(f.value())));
    table.set_header(header);

    for string in GuitarString::ALL.iter().rev() {
        let mut row = vec![Cell::new(format!("{} ({})", string.number(), string.letter()))];
        row.extend(frets.iter().map(|f| Cell::new(note_at(*string, *f))));
        table.add_row(row);
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_lists_every_string() {
        let table = note_table(12);
        assert_eq!(table.row_iter().count(), 6);
        let rendered = table.to_string();
        assert!(rendered.contains("1 (E)"));
        assert!(rendered.contains("6 (E)"));
        assert!(rendered.contains("A#"));
    }

    #[test]
    fn open_strings_only() {
        let rendered = note_table(0).to_string();
        assert!(rendered.contains("3 (G)"));
        assert!(!rendered.contains("F#"));
    }
}
