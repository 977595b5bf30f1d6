/// The twelve equal-tempered pitch classes, spelled with sharps.
///
/// Discriminants are the index within the octave starting at C, so
/// `NoteName::from_index(midi.rem_euclid(12))` names any MIDI note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum NoteName {
    C = 0,
    CSharp,
    D,
    DSharp,
    E,
    F,
    FSharp,
    G,
    GSharp,
    A,
    ASharp,
    B,
}

impl NoteName {
    /// All pitch classes in ascending order from C.
    pub const ALL: [NoteName; 12] = [
        NoteName::C,
        NoteName::CSharp,
        NoteName::D,
        NoteName::DSharp,
        NoteName::E,
        NoteName::F,
        NoteName::FSharp,
        NoteName::G,
        NoteName::GSharp,
        NoteName::A,
        NoteName::ASharp,
        NoteName::B,
    ];

    /// Pitch class for an index within the octave. Wraps modulo 12.
    pub const fn from_index(index: u8) -> Self {
        Self::ALL[(index % 12) as usize]
    }

    /// Index within the octave (C = 0 … B = 11).
    pub const fn index(self) -> u8 {
        self as u8
    }

    /// Display name, e.g. `"C"` or `"F#"`.
    pub const fn as_str(self) -> &'static str {
        match self {
            NoteName::C => "C",
            NoteName::CSharp => "C#",
            NoteName::D => "D",
            NoteName::DSharp => "D#",
            NoteName::E => "E",
            NoteName::F => "F",
            NoteName::FSharp => "F#",
            NoteName::G => "G",
            NoteName::GSharp => "G#",
            NoteName::A => "A",
            NoteName::ASharp => "A#",
            NoteName::B => "B",
        }
    }

    /// ASCII letter of the note without its accidental.
    pub const fn letter(self) -> u8 {
        self.as_str().as_bytes()[0]
    }

    /// `true` for the five sharpened pitch classes.
    pub const fn is_sharp(self) -> bool {
        matches!(
            self,
            NoteName::CSharp
                | NoteName::DSharp
                | NoteName::FSharp
                | NoteName::GSharp
                | NoteName::ASharp
        )
    }
}
