
/// md5 of a beatmap's raw bytes, used as its identity
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Md5Hash(u128);
impl Md5Hash {
    pub fn of(bytes: impl AsRef<[u8]>) -> Self {
        let digest = md5::compute(bytes);
        Self(u128::from_be_bytes(digest.0))
    }
}

impl TryFrom<&str> for Md5Hash {
    type Error = std::num::ParseIntError;

    fn try_from(s:&str) -> Result<Self, Self::Error> {
        Ok(Self(u128::from_str_radix(s, 16)?))
    }
}

impl AsRef<u128> for Md5Hash {
    fn as_ref(&self) -> &u128 {
        &self.0
    }
}

impl std::fmt::Display for Md5Hash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:032x}", self.0)
    }
}

impl serde::Serialize for Md5Hash {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}


#[test]
fn hash_display_round_trips() {
    let hash = Md5Hash::of("");
    assert_eq!(hash.to_string(), "d41d8cd98f00b204e9800998ecf8427e");
    assert_eq!(Md5Hash::try_from("d41d8cd98f00b204e9800998ecf8427e").unwrap(), hash);
}
