/// Identifies the marker strings that delimit directives within text.
///
/// The actual value of each marker is derived from [`Delimiters`][`super::Delimiters`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Marker {
    /// Beginning of a literal section, `<%%` by default.
    ///
    /// Everything up to the next close is written out as text, including the
    /// delimiters themselves.
    BeginLiteral = 0,
    /// Beginning of a raw output, `<%=` by default.
    BeginOutput = 1,
    /// Beginning of an escaped output, `<%-` by default.
    BeginEscaped = 2,
    /// Beginning of a comment, `<%#` by default.
    BeginComment = 3,
    /// Beginning of a conditional, `<%?` by default.
    BeginCheck = 4,
    /// Beginning of a switch, `<%:` by default.
    BeginShift = 5,
    /// Beginning of a loop, `<%~` by default.
    BeginLoop = 6,
    /// Beginning of a statement, `<%` by default.
    Begin = 7,
    /// End of any directive, `%>` by default.
    Close = 8,
    /// Same as Close, but the single newline that follows it is removed,
    /// `-%>` by default.
    CloseTrim = 9,
    /// Same as Close, `=%>` by default.
    CloseEqual = 10,
}

impl Marker {
    /// Every marker, in the order of their numeric identifiers.
    pub const ALL: [Marker; 11] = [
        Marker::BeginLiteral,
        Marker::BeginOutput,
        Marker::BeginEscaped,
        Marker::BeginComment,
        Marker::BeginCheck,
        Marker::BeginShift,
        Marker::BeginLoop,
        Marker::Begin,
        Marker::Close,
        Marker::CloseTrim,
        Marker::CloseEqual,
    ];

    /// Return true if this marker opens a directive.
    pub fn is_begin(self) -> bool {
        !self.is_close()
    }

    /// Return true if this marker closes a directive.
    pub fn is_close(self) -> bool {
        matches!(self, Marker::Close | Marker::CloseTrim | Marker::CloseEqual)
    }
}

impl From<usize> for Marker {
    fn from(value: usize) -> Self {
        match value {
            0 => Self::BeginLiteral,
            1 => Self::BeginOutput,
            2 => Self::BeginEscaped,
            3 => Self::BeginComment,
            4 => Self::BeginCheck,
            5 => Self::BeginShift,
            6 => Self::BeginLoop,
            7 => Self::Begin,
            8 => Self::Close,
            9 => Self::CloseTrim,
            10 => Self::CloseEqual,
            _ => unreachable!(),
        }
    }
}

impl From<Marker> for usize {
    fn from(k: Marker) -> Self {
        k as usize
    }
}
