//! Declarative helpers for the small, closed enums used throughout the wire
//! format (QTYPE, QCLASS, OPCODE, RCODE). Each generated enum gets an
//! `Unknown(repr)` catch-all variant so decoding arbitrary wire data never
//! panics on a value we don't happen to have a name for.
#[macro_export]
macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        $name:ident : $repr:ty {
            $($variant:ident = $val:expr => $alias:expr),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),+,
            Unknown($repr),
        }

        impl $name {
            pub fn value(&self) -> $repr {
                match self {
                    $($name::$variant => $val),+,
                    $name::Unknown(v) => *v,
                }
            }

            pub fn from_value(v: $repr) -> Self {
                match v {
                    $($val => $name::$variant),+,
                    other => $name::Unknown(other),
                }
            }

            pub fn alias(&self) -> &'static str {
                match self {
                    $($name::$variant => $alias),+,
                    $name::Unknown(_) => "UNKNOWN",
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let upper = s.to_ascii_uppercase();
                match upper.as_str() {
                    $($alias => Ok($name::$variant)),+,
                    _ => Err(format!("unrecognized {} alias '{}'", stringify!($name), s)),
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                write!(f, "{}", self.alias())
            }
        }

        impl Default for $name {
            fn default() -> Self {
                $name::from_value(0 as $repr)
            }
        }
    };
}

// Renders a byte slice for a debug! log line. "X" gives a hex dump, "C" an
// ASCII-ish dump with non-printable bytes shown as '.'; mirrors the two
// dump styles the resolver sprinkles through its trace-level logging.
#[macro_export]
macro_rules! format_buffer {
    ("X", $buf:expr) => {{
        let b: &[u8] = $buf;
        b.iter()
            .map(|x| format!("{:02x}", x))
            .collect::<Vec<_>>()
            .join(" ")
    }};
    ("C", $buf:expr) => {{
        let b: &[u8] = $buf;
        b.iter()
            .map(|x| {
                if x.is_ascii_graphic() {
                    *x as char
                } else {
                    '.'
                }
            })
            .collect::<String>()
    }};
}
