use serde::{Deserialize, Serialize};

/// File sharing protocol exposed by an edge gateway share
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShareAccessProtocol {
    ///
    #[serde(rename = "SMB")]
    Smb,
    ///
    #[serde(rename = "NFS")]
    Nfs,
    /// A protocol added to the service after this release
    #[serde(other)]
    Unknown,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn protocols_use_upper_case_names_and_tolerate_others() {
        assert_eq!(serde_json::to_string(&ShareAccessProtocol::Smb).unwrap(), r#""SMB""#);
        assert_eq!(
            serde_json::from_str::<ShareAccessProtocol>(r#""NFS""#).unwrap(),
            ShareAccessProtocol::Nfs
        );
        assert_eq!(
            serde_json::from_str::<ShareAccessProtocol>(r#""nfs""#).unwrap(),
            ShareAccessProtocol::Unknown
        );
    }
}
