//! Named-encoding registry and the interned [`Encoding`] descriptor.

use alloc::{
    borrow::ToOwned,
    collections::BTreeMap,
    string::String,
    sync::Arc,
    vec::Vec,
};
use core::fmt;

use spin::{Once, RwLock};

use crate::{
    codec::{AsciiCodec, Codec, SingleByteCodec, Utf8Codec, Utf16Codec},
    coder::ErrorAction,
    decoder::Decoder,
    encoder::Encoder,
    error::{RegisterError, ResolveError},
};

/// An encoding name may hold ASCII letters, digits, `-`, `.`, `:`, and `_`,
/// and must not be empty.
fn is_legal_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'-' | b'.' | b':' | b'_'))
}

/// Case-insensitive ordering over the restricted name alphabet.
fn caseless_cmp(a: &str, b: &str) -> core::cmp::Ordering {
    a.bytes()
        .map(|b| b.to_ascii_lowercase())
        .cmp(b.bytes().map(|b| b.to_ascii_lowercase()))
}

struct Descriptor {
    name: String,
    aliases: Vec<String>,
    codec: Arc<dyn Codec>,
}

/// An immutable, interned encoding descriptor.
///
/// Descriptors are manufactured by [`Registry::register`] and handed out by
/// [`Registry::resolve`]; resolving the canonical name or any alias yields a
/// handle to the same descriptor. Cloning is cheap. Two descriptors compare
/// equal iff their canonical names match exactly.
#[derive(Clone)]
pub struct Encoding {
    shared: Arc<Descriptor>,
}

impl Encoding {
    /// The canonical name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.shared.name
    }

    /// The alias names, in registration order.
    #[must_use]
    pub fn aliases(&self) -> &[String] {
        &self.shared.aliases
    }

    /// A fresh decoder for this encoding, with [`ErrorAction::Report`] for
    /// both error cases and the default replacement.
    #[must_use]
    pub fn new_decoder(&self) -> Decoder {
        Decoder::new(&*self.shared.codec)
    }

    /// A fresh encoder for this encoding, with [`ErrorAction::Report`] for
    /// both error cases and the codec's preferred replacement.
    #[must_use]
    pub fn new_encoder(&self) -> Encoder {
        Encoder::new(&*self.shared.codec)
    }

    /// Decodes `bytes` in one call, substituting the replacement character
    /// for every malformed or unmappable run.
    #[must_use]
    pub fn decode_lossy(&self, bytes: &[u8]) -> String {
        let mut decoder = self.new_decoder();
        decoder
            .on_malformed_input(ErrorAction::Replace)
            .on_unmappable_character(ErrorAction::Replace);
        match decoder.convert_all(bytes) {
            Ok(text) => text,
            Err(_) => unreachable!("replacing coders recover every content error"),
        }
    }

    /// Encodes `text` in one call, substituting the codec's replacement
    /// bytes for every unmappable character.
    #[must_use]
    pub fn encode_lossy(&self, text: &str) -> Vec<u8> {
        let mut encoder = self.new_encoder();
        encoder
            .on_malformed_input(ErrorAction::Replace)
            .on_unmappable_character(ErrorAction::Replace);
        match encoder.convert_all(text) {
            Ok(bytes) => bytes,
            Err(_) => unreachable!("replacing coders recover every content error"),
        }
    }
}

impl PartialEq for Encoding {
    fn eq(&self, other: &Self) -> bool {
        self.shared.name == other.shared.name
    }
}

impl Eq for Encoding {}

impl fmt::Debug for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Encoding")
            .field("name", &self.shared.name)
            .field("aliases", &self.shared.aliases)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.shared.name)
    }
}

/// Maps encoding names, case-insensitively and including aliases, to
/// [`Encoding`] descriptors.
///
/// Registration takes `&mut self` and happens up front; after that the
/// registry is read-only and [`resolve`](Registry::resolve) may be called
/// freely from many threads. Each successful resolution caches the exact
/// query string, so a recurring unusual spelling costs one cache probe after
/// its first lookup.
///
/// A process-wide instance holding the built-in encodings is available via
/// [`Registry::global`]; code that registers its own codecs owns a registry
/// value and threads it to the use sites.
///
/// # Examples
///
/// ```
/// use recoder::Registry;
///
/// let registry = Registry::with_builtins();
/// let utf8 = registry.resolve("utf-8").unwrap();
/// assert_eq!(utf8.name(), "UTF-8");
/// assert_eq!(utf8.decode_lossy(&[0x68, 0x69]), "hi");
/// ```
pub struct Registry {
    descriptors: Vec<Encoding>,
    /// Lowercased canonical names and aliases, fixed at registration time.
    names: BTreeMap<String, usize>,
    /// Exact query strings from earlier successful resolutions.
    cache: RwLock<BTreeMap<String, usize>>,
}

impl Registry {
    /// An empty registry.
    #[must_use]
    pub fn new() -> Self {
        Registry {
            descriptors: Vec::new(),
            names: BTreeMap::new(),
            cache: RwLock::new(BTreeMap::new()),
        }
    }

    /// A registry holding the built-in encodings: the UTF-8 and UTF-16
    /// families, US-ASCII, ISO-8859-1, ISO-8859-15, windows-1252,
    /// windows-874, and KOI8-R.
    #[must_use]
    pub fn with_builtins() -> Self {
        let mut registry = Registry::new();
        let builtins: [(&str, &[&str], Arc<dyn Codec>); 10] = [
            (
                "UTF-8",
                &["UTF8", "unicode-1-1-utf-8"],
                Arc::new(Utf8Codec),
            ),
            (
                "UTF-16",
                &["UTF_16", "utf16", "unicode"],
                Arc::new(Utf16Codec::with_mark()),
            ),
            (
                "UTF-16BE",
                &["UTF_16BE", "X-UTF-16BE", "UnicodeBigUnmarked"],
                Arc::new(Utf16Codec::big_endian()),
            ),
            (
                "UTF-16LE",
                &["UTF_16LE", "X-UTF-16LE", "UnicodeLittleUnmarked"],
                Arc::new(Utf16Codec::little_endian()),
            ),
            (
                "US-ASCII",
                &["ASCII", "ascii7", "646", "iso_646.irv:1983", "csASCII", "default"],
                Arc::new(AsciiCodec),
            ),
            (
                "ISO-8859-1",
                &["8859_1", "ISO8859_1", "ISO_8859-1:1987", "latin1", "l1", "cp819", "csISOLatin1"],
                Arc::new(SingleByteCodec::latin1()),
            ),
            (
                "ISO-8859-15",
                &["8859_15", "ISO8859_15", "LATIN9", "L9", "csISOlatin9"],
                Arc::new(SingleByteCodec::latin9()),
            ),
            ("windows-1252", &["cp1252"], Arc::new(SingleByteCodec::windows_1252())),
            ("windows-874", &["cp874", "ms874"], Arc::new(SingleByteCodec::windows_874())),
            ("KOI8-R", &["koi8_r", "koi8", "cskoi8r"], Arc::new(SingleByteCodec::koi8_r())),
        ];
        for (name, aliases, codec) in builtins {
            match registry.register(name, aliases, codec) {
                Ok(()) => {}
                Err(_) => unreachable!("built-in names are legal and disjoint"),
            }
        }
        registry
    }

    /// The process-wide registry of built-in encodings, constructed on first
    /// use.
    pub fn global() -> &'static Registry {
        static GLOBAL: Once<Registry> = Once::new();
        GLOBAL.call_once(Registry::with_builtins)
    }

    /// Adds a descriptor under `canonical` and each of `aliases`.
    ///
    /// # Errors
    ///
    /// Rejects names that violate the encoding-name character rule and names
    /// already taken, by this call or an earlier one. A failed registration
    /// leaves the registry unchanged.
    pub fn register(
        &mut self,
        canonical: &str,
        aliases: &[&str],
        codec: Arc<dyn Codec>,
    ) -> Result<(), RegisterError> {
        let mut keys = Vec::with_capacity(1 + aliases.len());
        for &name in core::iter::once(&canonical).chain(aliases) {
            if !is_legal_name(name) {
                return Err(RegisterError::IllegalName(name.to_owned()));
            }
            let key = name.to_ascii_lowercase();
            if self.names.contains_key(&key) || keys.contains(&key) {
                return Err(RegisterError::Duplicate(name.to_owned()));
            }
            keys.push(key);
        }
        let index = self.descriptors.len();
        self.descriptors.push(Encoding {
            shared: Arc::new(Descriptor {
                name: canonical.to_owned(),
                aliases: aliases.iter().map(|&a| a.to_owned()).collect(),
                codec,
            }),
        });
        for key in keys {
            self.names.insert(key, index);
        }
        Ok(())
    }

    /// Resolves `name`, case-insensitively against canonical names and
    /// aliases, to its descriptor.
    ///
    /// # Errors
    ///
    /// [`ResolveError::IllegalName`] when `name` violates the encoding-name
    /// character rule; no lookup is attempted for such names.
    /// [`ResolveError::Unsupported`] when no registered encoding answers to
    /// a well-formed `name`.
    pub fn resolve(&self, name: &str) -> Result<Encoding, ResolveError> {
        if !is_legal_name(name) {
            return Err(ResolveError::IllegalName(name.to_owned()));
        }
        if let Some(&index) = self.cache.read().get(name) {
            return Ok(self.descriptors[index].clone());
        }
        let Some(&index) = self.names.get(&name.to_ascii_lowercase()) else {
            return Err(ResolveError::Unsupported(name.to_owned()));
        };
        self.cache.write().insert(name.to_owned(), index);
        Ok(self.descriptors[index].clone())
    }

    /// The canonical names of every registered encoding, ordered
    /// case-insensitively.
    ///
    /// The snapshot is freshly allocated; encodings registered after it is
    /// taken do not appear in it.
    #[must_use]
    pub fn available_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .descriptors
            .iter()
            .map(|encoding| encoding.name().to_owned())
            .collect();
        names.sort_unstable_by(|a, b| caseless_cmp(a, b));
        names
    }
}

impl Default for Registry {
    fn default() -> Self {
        Registry::new()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("descriptors", &self.descriptors)
            .finish_non_exhaustive()
    }
}
