//! Sound content
//!
//! Sounds are kept as encoded bytes; the audio system decodes them when it
//! creates a source. Loading only checks that the container is one the
//! audio system understands.

use std::sync::Arc;

use crate::error::ContentError;
use crate::files::FileSource;
use crate::kind::ResourceKind;
use crate::loadable::Decode;

/// Audio container format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundFormat {
    /// RIFF/WAVE
    Wav,
    /// Ogg (Vorbis)
    Ogg,
    /// FLAC
    Flac,
    /// MPEG layer III
    Mp3,
}

impl SoundFormat {
    /// Detect the container from the leading bytes
    #[must_use]
    pub fn sniff(bytes: &[u8]) -> Option<Self> {
        match bytes {
            [b'R', b'I', b'F', b'F', _, _, _, _, b'W', b'A', b'V', b'E', ..] => Some(Self::Wav),
            [b'O', b'g', b'g', b'S', ..] => Some(Self::Ogg),
            [b'f', b'L', b'a', b'C', ..] => Some(Self::Flac),
            [b'I', b'D', b'3', ..] => Some(Self::Mp3),
            [0xff, second, ..] if second & 0xe0 == 0xe0 => Some(Self::Mp3),
            _ => None,
        }
    }
}

/// Encoded audio clip
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sound {
    /// Container format
    pub format: SoundFormat,
    /// Encoded bytes, shareable with the audio thread
    pub bytes: Arc<[u8]>,
}

impl Decode for Sound {
    const KIND: ResourceKind = ResourceKind::Sound;

    fn decode(path: &str, files: &dyn FileSource) -> Result<Self, ContentError> {
        let bytes = files.read(path)?;
        let format = SoundFormat::sniff(&bytes).ok_or_else(|| {
            ContentError::DecodeError(format!("sound '{path}' is not WAV, Ogg, FLAC or MP3"))
        })?;

        Ok(Self {
            format,
            bytes: bytes.into(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::files::MemoryFiles;

    #[test]
    fn test_sniff_formats() {
        assert_eq!(
            SoundFormat::sniff(b"RIFF\x24\x00\x00\x00WAVEfmt "),
            Some(SoundFormat::Wav)
        );
        assert_eq!(SoundFormat::sniff(b"OggS\x00\x02"), Some(SoundFormat::Ogg));
        assert_eq!(SoundFormat::sniff(b"fLaC\x00"), Some(SoundFormat::Flac));
        assert_eq!(SoundFormat::sniff(b"ID3\x03"), Some(SoundFormat::Mp3));
        assert_eq!(SoundFormat::sniff(&[0xff, 0xfb, 0x90]), Some(SoundFormat::Mp3));
        assert_eq!(SoundFormat::sniff(b"RIFF\x24\x00\x00\x00AVI "), None);
        assert_eq!(SoundFormat::sniff(b""), None);
    }

    #[test]
    fn test_decode_keeps_bytes() {
        let files = MemoryFiles::new();
        files.insert("click.ogg", b"OggS rest of stream".to_vec());

        let sound = Sound::decode("click.ogg", &files).unwrap();
        assert_eq!(sound.format, SoundFormat::Ogg);
        assert_eq!(sound.bytes.len(), 19);
    }

    #[test]
    fn test_unknown_container() {
        let files = MemoryFiles::new();
        files.insert("notes.txt", "la la la");
        assert!(Sound::decode("notes.txt", &files).is_err());
    }
}
