use std::fmt::{Display, Write};
use std::str::FromStr;
use thiserror::Error;

/// Set-user-ID bit.
pub const SETUID: u32 = 0o4000;
/// Set-group-ID bit.
pub const SETGID: u32 = 0o2000;
/// Sticky bit (restricted deletion flag on directories).
pub const STICKY: u32 = 0o1000;
/// Every bit that `chmod` is allowed to change.
pub const MODE_MASK: u32 = 0o7777;

const WHO_USER: u8 = 0b100;
const WHO_GROUP: u8 = 0b010;
const WHO_OTHER: u8 = 0b001;
const WHO_ALL: u8 = WHO_USER | WHO_GROUP | WHO_OTHER;

const PERM_READ: u8 = 0b00_0001;
const PERM_WRITE: u8 = 0b00_0010;
const PERM_EXEC: u8 = 0b00_0100;
const PERM_SEARCH: u8 = 0b00_1000;
const PERM_SETID: u8 = 0b01_0000;
const PERM_STICKY: u8 = 0b10_0000;
// order used when rendering a permission list
const PERM_LETTERS: [(u8, char); 6] = [
    (PERM_READ, 'r'),
    (PERM_WRITE, 'w'),
    (PERM_EXEC, 'x'),
    (PERM_SEARCH, 'X'),
    (PERM_SETID, 's'),
    (PERM_STICKY, 't'),
];

/// Error returned when a mode string can not be parsed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseModeError {
    #[error("empty mode")]
    Empty,
    #[error("octal mode `{0}` is out of range")]
    OctalOutOfRange(String),
    #[error("empty clause in mode `{0}`")]
    EmptyClause(String),
    #[error("missing operator in clause `{0}`")]
    MissingOperator(String),
    #[error("invalid character `{found}` in mode `{mode}`")]
    InvalidCharacter { found: char, mode: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Op {
    Add,
    Remove,
    Assign,
}

impl Op {
    fn from_char(c: char) -> Option<Op> {
        match c {
            '+' => Some(Op::Add),
            '-' => Some(Op::Remove),
            '=' => Some(Op::Assign),
            _ => None,
        }
    }

    fn to_char(self) -> char {
        match self {
            Op::Add => '+',
            Op::Remove => '-',
            Op::Assign => '=',
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Perms {
    /// Combination of the `PERM_*` flags.
    List(u8),
    /// Copy the permissions currently granted to one of the `WHO_*` classes.
    Copy(u8),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Action {
    op: Op,
    perms: Perms,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Clause {
    /// Combination of the `WHO_*` flags. Zero when no class was written, which acts as `a`.
    who: u8,
    actions: Vec<Action>,
}

/// A file mode as accepted by `chmod`.
///
/// Either an absolute octal mode (`755`, `0644`, `4755`) or a list of comma-separated symbolic
/// clauses in the form `[ugoa]*([-+=]([rwxXst]*|[ugo]))+`, for example `u+x`, `go-w,a+X` or
/// `g=u`.
///
/// # Examples
/// ```
/// use enginegen::fileutils::Mode;
///
/// let mode = Mode::parse("u+x,go-w").unwrap();
/// assert_eq!(mode.apply(0o666, false), 0o744);
/// let mode = Mode::parse("750").unwrap();
/// assert_eq!(mode.apply(0o644, false), 0o750);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mode {
    repr: Repr,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Repr {
    Octal(u32),
    Symbolic(Vec<Clause>),
}

impl Mode {
    /// Parses a mode string.
    ///
    /// # Errors
    /// Returns a [ParseModeError] describing the first problem found in the string.
    pub fn parse(mode: &str) -> Result<Mode, ParseModeError> {
        if mode.is_empty() {
            Err(ParseModeError::Empty)
        } else if mode.chars().all(|c| c.is_ascii_digit()) {
            parse_octal(mode)
        } else {
            let clauses = mode
                .split(',')
                .map(|clause| parse_clause(clause, mode))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Mode {
                repr: Repr::Symbolic(clauses),
            })
        }
    }

    /// Creates an absolute mode. Bits outside [MODE_MASK] are dropped.
    pub fn from_octal(bits: u32) -> Mode {
        Mode {
            repr: Repr::Octal(bits & MODE_MASK),
        }
    }

    /// Returns the value of an absolute mode, or `None` for symbolic modes.
    pub fn octal(&self) -> Option<u32> {
        match self.repr {
            Repr::Octal(bits) => Some(bits),
            Repr::Symbolic(_) => None,
        }
    }

    /// Computes the mode resulting from applying `self` to a file currently having mode `current`.
    ///
    /// `is_dir` is required by the `X` permission, that grants execution to directories even if no
    /// execute bit is set. Only the bits in [MODE_MASK] are considered and returned.
    pub fn apply(&self, current: u32, is_dir: bool) -> u32 {
        match &self.repr {
            Repr::Octal(bits) => *bits,
            Repr::Symbolic(clauses) => clauses.iter().fold(current & MODE_MASK, |mode, clause| {
                clause
                    .actions
                    .iter()
                    .fold(mode, |mode, action| apply_action(clause.who, action, mode, is_dir))
            }),
        }
    }
}

impl FromStr for Mode {
    type Err = ParseModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Mode::parse(s)
    }
}

impl Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.repr {
            Repr::Octal(bits) => write!(f, "{:04o}", bits),
            Repr::Symbolic(clauses) => {
                for (index, clause) in clauses.iter().enumerate() {
                    if index > 0 {
                        f.write_char(',')?;
                    }
                    f.write_str(&who_to_string(clause.who))?;
                    for action in &clause.actions {
                        f.write_char(action.op.to_char())?;
                        match action.perms {
                            Perms::List(list) => {
                                for (flag, letter) in PERM_LETTERS {
                                    if list & flag != 0 {
                                        f.write_char(letter)?;
                                    }
                                }
                            }
                            Perms::Copy(class) => f.write_str(&who_to_string(class))?,
                        }
                    }
                }
                Ok(())
            }
        }
    }
}

fn parse_octal(mode: &str) -> Result<Mode, ParseModeError> {
    if let Some(found) = mode.chars().find(|c| !('0'..='7').contains(c)) {
        return Err(ParseModeError::InvalidCharacter {
            found,
            mode: mode.to_string(),
        });
    }
    if mode.len() > 4 {
        return Err(ParseModeError::OctalOutOfRange(mode.to_string()));
    }
    match u32::from_str_radix(mode, 8) {
        Ok(bits) if bits <= MODE_MASK => Ok(Mode::from_octal(bits)),
        _ => Err(ParseModeError::OctalOutOfRange(mode.to_string())),
    }
}

fn parse_clause(clause: &str, mode: &str) -> Result<Clause, ParseModeError> {
    if clause.is_empty() {
        return Err(ParseModeError::EmptyClause(mode.to_string()));
    }
    let invalid = |found| ParseModeError::InvalidCharacter {
        found,
        mode: mode.to_string(),
    };
    let mut chars = clause.chars().peekable();
    let mut who = 0;
    while let Some(&c) = chars.peek() {
        match c {
            'u' => who |= WHO_USER,
            'g' => who |= WHO_GROUP,
            'o' => who |= WHO_OTHER,
            'a' => who |= WHO_ALL,
            _ => break,
        }
        chars.next();
    }
    let mut actions = Vec::new();
    while let Some(c) = chars.next() {
        let op = Op::from_char(c).ok_or_else(|| {
            if actions.is_empty() {
                ParseModeError::MissingOperator(clause.to_string())
            } else {
                invalid(c)
            }
        })?;
        let perms = match chars.peek() {
            Some('u') | Some('g') | Some('o') => {
                let class = match chars.next() {
                    Some('u') => WHO_USER,
                    Some('g') => WHO_GROUP,
                    _ => WHO_OTHER,
                };
                // a copied class can only be followed by another action
                if let Some(&next) = chars.peek() {
                    if Op::from_char(next).is_none() {
                        return Err(invalid(next));
                    }
                }
                Perms::Copy(class)
            }
            _ => {
                let mut list = 0;
                while let Some(&c) = chars.peek() {
                    if Op::from_char(c).is_some() {
                        break;
                    }
                    let flag = PERM_LETTERS
                        .iter()
                        .find(|(_, letter)| *letter == c)
                        .map(|(flag, _)| *flag)
                        .ok_or_else(|| invalid(c))?;
                    list |= flag;
                    chars.next();
                }
                Perms::List(list)
            }
        };
        actions.push(Action { op, perms });
    }
    if actions.is_empty() {
        Err(ParseModeError::MissingOperator(clause.to_string()))
    } else {
        Ok(Clause { who, actions })
    }
}

fn apply_action(who: u8, action: &Action, mode: u32, is_dir: bool) -> u32 {
    let who = if who == 0 { WHO_ALL } else { who };
    let bits = match action.perms {
        Perms::List(list) => {
            let mut triple = 0;
            if list & PERM_READ != 0 {
                triple |= 0o4;
            }
            if list & PERM_WRITE != 0 {
                triple |= 0o2;
            }
            if list & PERM_EXEC != 0 {
                triple |= 0o1;
            }
            if list & PERM_SEARCH != 0 && (is_dir || mode & 0o111 != 0) {
                triple |= 0o1;
            }
            let mut bits = spread(triple, who);
            if list & PERM_SETID != 0 {
                if who & WHO_USER != 0 {
                    bits |= SETUID;
                }
                if who & WHO_GROUP != 0 {
                    bits |= SETGID;
                }
            }
            if list & PERM_STICKY != 0 && who & WHO_OTHER != 0 {
                bits |= STICKY;
            }
            bits
        }
        Perms::Copy(class) => spread((mode >> class_shift(class)) & 0o7, who),
    };
    match action.op {
        Op::Add => mode | bits,
        Op::Remove => mode & !bits,
        Op::Assign => (mode & !class_mask(who)) | bits,
    }
}

fn class_shift(class: u8) -> u32 {
    match class {
        WHO_USER => 6,
        WHO_GROUP => 3,
        _ => 0,
    }
}

/// Replicates an `rwx` triple on every class in `who`.
fn spread(triple: u32, who: u8) -> u32 {
    [WHO_USER, WHO_GROUP, WHO_OTHER]
        .iter()
        .filter(|class| who & **class != 0)
        .fold(0, |acc, class| acc | (triple << class_shift(*class)))
}

/// Every bit owned by the classes in `who`, special bits included.
fn class_mask(who: u8) -> u32 {
    let mut mask = spread(0o7, who);
    if who & WHO_USER != 0 {
        mask |= SETUID;
    }
    if who & WHO_GROUP != 0 {
        mask |= SETGID;
    }
    if who & WHO_OTHER != 0 {
        mask |= STICKY;
    }
    mask
}

fn who_to_string(who: u8) -> String {
    if who == WHO_ALL {
        "a".to_string()
    } else {
        [(WHO_USER, 'u'), (WHO_GROUP, 'g'), (WHO_OTHER, 'o')]
            .iter()
            .filter(|(class, _)| who & class != 0)
            .map(|(_, letter)| letter)
            .collect()
    }
}

/// Renders a mode in the form printed by `ls -l`, for example `drwxr-sr-x`.
pub fn mode_string(mode: u32, is_dir: bool) -> String {
    let mut retval = String::with_capacity(10);
    retval.push(if is_dir { 'd' } else { '-' });
    let specials = [(SETUID, 's'), (SETGID, 's'), (STICKY, 't')];
    for (index, (special, letter)) in specials.iter().enumerate() {
        let triple = (mode >> (6 - 3 * index)) & 0o7;
        retval.push(if triple & 0o4 != 0 { 'r' } else { '-' });
        retval.push(if triple & 0o2 != 0 { 'w' } else { '-' });
        let exec = triple & 0o1 != 0;
        retval.push(match (mode & special != 0, exec) {
            (true, true) => *letter,
            (true, false) => letter.to_ascii_uppercase(),
            (false, true) => 'x',
            (false, false) => '-',
        });
    }
    retval
}
