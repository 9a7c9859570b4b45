use sha1::{Digest, Sha1};

/// 20-byte peer identity presented to the swarm.
///
/// Derived from the local hostname the way the original client did: the
/// hostname is truncated to 20 bytes, left-padded with spaces to exactly 20
/// (C `"%20s"` formatting), then SHA-1 hashed. Any hostname, including the
/// empty string, produces a deterministic fixed-length identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeerId([u8; 20]);

impl PeerId {
    /// Derive the identity from an arbitrary hostname string.
    pub fn derive(hostname: &str) -> Self {
        // Back off to a char boundary so multibyte hostnames don't panic.
        let mut end = hostname.len().min(20);
        while !hostname.is_char_boundary(end) {
            end -= 1;
        }
        let truncated = &hostname[..end];
        let padded = format!("{truncated:>20}");
        let digest = Sha1::digest(padded.as_bytes());
        Self(digest.into())
    }

    /// Derive the identity from this host's name.
    pub fn from_local_hostname() -> Self {
        let hostname = nix::unistd::gethostname()
            .map(|h| h.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self::derive(&hostname)
    }

    pub fn into_bytes(self) -> [u8; 20] {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_is_deterministic() {
        assert_eq!(PeerId::derive("node001"), PeerId::derive("node001"));
        assert_ne!(PeerId::derive("node001"), PeerId::derive("node002"));
    }

    #[test]
    fn empty_hostname_still_yields_identity() {
        let id = PeerId::derive("");
        assert_eq!(id.into_bytes().len(), 20);
        // Pure padding, still deterministic.
        assert_eq!(id, PeerId::derive(""));
    }

    #[test]
    fn long_hostname_truncates_to_twenty_bytes() {
        let long = "a-hostname-well-beyond-twenty-characters.example.com";
        let id = PeerId::derive(long);
        // Only the first 20 bytes matter once the field is saturated.
        assert_eq!(id, PeerId::derive(&long[..20]));
    }

    #[test]
    fn padding_is_position_sensitive() {
        // Left-padding means a trailing space changes the 20-byte field.
        assert_ne!(PeerId::derive("node1"), PeerId::derive("node1 "));
    }

    #[test]
    fn local_hostname_derivation_never_fails() {
        let id = PeerId::from_local_hostname();
        assert_eq!(id.into_bytes().len(), 20);
    }
}
