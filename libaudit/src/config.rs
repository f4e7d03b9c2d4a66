use crate::auditor::Auditor;
use crate::crypto::commitment::GENERATOR_COUNT;
use crate::crypto::keys::{KeyError, PublicKey, SecretKey};
use crate::crypto::{PedersenParams, SchnorrSigner, Signer};
use crate::identity::AuditInfoMatcher;
use crate::token::ActionDeserializer;
use rand::rngs::StdRng;
use rand::SeedableRng;
use ron::ser::PrettyConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Could not parse auditor configuration. {0}")]
    Parse(#[from] ron::error::SpannedError),
    #[error("Could not write auditor configuration. {0}")]
    Serialize(#[from] ron::Error),
    #[error("Expected {GENERATOR_COUNT} Pedersen generators, got {0}")]
    GeneratorCount(usize),
    #[error("Generator {index} is not a valid group element. {source}")]
    Key {
        index: usize,
        #[source]
        source: KeyError,
    },
    #[error("Could not seed the signer's random number generator. {0}")]
    Rng(String),
}

/// The auditor's configuration: the Pedersen generators of the token management context and, when the auditor
/// endorses requests, its signing key. Points and keys are hex encoded.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditorConfig {
    pub generators: Vec<String>,
    #[serde(default)]
    pub signing_key: Option<SecretKey>,
}

impl AuditorConfig {
    pub fn from_params(params: &PedersenParams) -> Self {
        let generators = params.generators().iter().map(|g| PublicKey::from(*g).as_hex()).collect();
        Self { generators, signing_key: None }
    }

    pub fn with_signing_key(mut self, key: SecretKey) -> Self {
        self.signing_key = Some(key);
        self
    }

    pub fn from_ron_str(s: &str) -> Result<Self, ConfigError> {
        Ok(ron::de::from_str(s)?)
    }

    pub fn to_ron_string(&self) -> Result<String, ConfigError> {
        let config = PrettyConfig::new().compact_arrays(false);
        Ok(ron::ser::to_string_pretty(self, config)?)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, anyhow::Error> {
        let val = fs::read_to_string(path)?;
        Ok(Self::from_ron_str(&val)?)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), anyhow::Error> {
        fs::write(path, self.to_ron_string()?)?;
        Ok(())
    }

    pub fn pedersen_params(&self) -> Result<PedersenParams, ConfigError> {
        if self.generators.len() != GENERATOR_COUNT {
            return Err(ConfigError::GeneratorCount(self.generators.len()));
        }
        let points = self
            .generators
            .iter()
            .enumerate()
            .map(|(index, g)| {
                PublicKey::from_hex(g).map(|p| *p.as_point()).map_err(|source| ConfigError::Key { index, source })
            })
            .collect::<Result<Vec<_>, _>>()?;
        PedersenParams::try_from(points).map_err(|_| ConfigError::GeneratorCount(self.generators.len()))
    }

    /// The auditor's signer, if a signing key is configured.
    pub fn signer(&self) -> Result<Option<Arc<dyn Signer>>, ConfigError> {
        let Some(key) = &self.signing_key else {
            return Ok(None);
        };
        let rng = StdRng::try_from_os_rng().map_err(|e| ConfigError::Rng(e.to_string()))?;
        let signer: Arc<dyn Signer> = Arc::new(SchnorrSigner::new(key.clone(), rng));
        Ok(Some(signer))
    }

    pub fn build_auditor(
        &self,
        matcher: Arc<dyn AuditInfoMatcher>,
        codec: Arc<dyn ActionDeserializer>,
    ) -> Result<Auditor, ConfigError> {
        let auditor = Auditor::new(self.pedersen_params()?, matcher, codec);
        match self.signer()? {
            Some(signer) => Ok(auditor.with_signer(signer)),
            None => Ok(auditor),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::identity::{KeyAuditInfoMatcher, MatcherDispatch};
    use crate::token::{JsonActionCodec, TokenRequest};
    use rand::rng;

    #[test]
    fn ron_config() {
        let params = PedersenParams::from_label(b"config");
        let config = AuditorConfig::from_params(&params).with_signing_key(SecretKey::random(&mut rng()));
        let text = config.to_ron_string().unwrap();
        let loaded = AuditorConfig::from_ron_str(&text).unwrap();
        assert_eq!(loaded, config);
        assert_eq!(loaded.pedersen_params().unwrap(), params);
    }

    #[test]
    fn bad_generators() {
        let params = PedersenParams::from_label(b"config");
        let mut config = AuditorConfig::from_params(&params);
        config.generators.pop();
        assert!(matches!(config.pedersen_params(), Err(ConfigError::GeneratorCount(2))));

        let mut config = AuditorConfig::from_params(&params);
        config.generators[1] = "zz".into();
        assert!(matches!(config.pedersen_params(), Err(ConfigError::Key { index: 1, .. })));

        assert!(matches!(AuditorConfig::from_ron_str("(generators: 5)"), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn file_round_trip_and_auditor() {
        let _ = env_logger::try_init();
        let params = PedersenParams::from_label(b"file");
        let config = AuditorConfig::from_params(&params).with_signing_key(SecretKey::random(&mut rng()));
        let path = std::env::temp_dir().join(format!("auditor-config-{}.ron", std::process::id()));
        config.save(&path).unwrap();
        let loaded = AuditorConfig::load(&path).unwrap();
        let _ = fs::remove_file(&path);
        assert_eq!(loaded, config);

        let matcher = Arc::new(MatcherDispatch::new(Arc::new(KeyAuditInfoMatcher)));
        let auditor = loaded.build_auditor(matcher, Arc::new(JsonActionCodec)).unwrap();
        assert!(auditor.has_signer());
        let request = TokenRequest { issues: vec![b"issue".to_vec()], ..Default::default() };
        assert!(!auditor.endorse(&request, "tx").unwrap().is_empty());

        let without_key = AuditorConfig::from_params(&params);
        assert!(without_key.signer().unwrap().is_none());
        assert!(AuditorConfig::load(std::env::temp_dir().join("does-not-exist.ron")).is_err());
    }
}
