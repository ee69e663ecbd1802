/// Message kind, the signature byte of a top-level structure.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum Signature {
    /// Client identification, first request on a fresh connection.
    Init = 0x01,
    /// Execute a statement with a parameter map.
    Run = 0x10,
    /// Stream every record of the current result.
    PullAll = 0x3F,
    /// Request acknowledged; fields carry summary metadata.
    Success = 0x70,
    /// One row of result data as a single list field.
    Record = 0x71,
    /// Request skipped because an earlier request failed.
    Ignored = 0x7E,
    /// Request failed; fields carry error metadata.
    Failure = 0x7F,
}

impl Signature {
    pub fn from_u8(signature: u8) -> Option<Signature> {
        Some(match signature {
            0x01 => Signature::Init,
            0x10 => Signature::Run,
            0x3F => Signature::PullAll,
            0x70 => Signature::Success,
            0x71 => Signature::Record,
            0x7E => Signature::Ignored,
            0x7F => Signature::Failure,
            _ => return None,
        })
    }

    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

impl std::fmt::Display for Signature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Signature::Init => "INIT",
            Signature::Run => "RUN",
            Signature::PullAll => "PULL_ALL",
            Signature::Success => "SUCCESS",
            Signature::Record => "RECORD",
            Signature::Ignored => "IGNORED",
            Signature::Failure => "FAILURE",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::Signature;

    #[test]
    fn signature_bytes_roundtrip() {
        for signature in [
            Signature::Init,
            Signature::Run,
            Signature::PullAll,
            Signature::Success,
            Signature::Record,
            Signature::Ignored,
            Signature::Failure,
        ] {
            assert_eq!(Signature::from_u8(signature.as_u8()), Some(signature));
        }
        assert_eq!(Signature::from_u8(0x42), None);
    }
}
