//! Message classification
//!
//! Splits message names into client-originated (`publish`) and
//! server-originated (`subscribe`) messages using a configured list of
//! publish names.

use asyncapi_openapi_common::{MessageClassification, TransformConfig, TransformWarning};
use std::collections::HashSet;

/// Classifies messages by the side that sends them
#[derive(Debug, Clone, Default)]
pub struct MessageClassifier {
    publish: Vec<String>,
}

impl MessageClassifier {
    pub fn new<I, S>(publish: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            publish: publish.into_iter().map(Into::into).collect(),
        }
    }

    pub fn from_config(config: &TransformConfig) -> Self {
        Self::new(config.publish_messages.iter().cloned())
    }

    /// Partition message names, keeping their source order
    ///
    /// Every name lands in exactly one of the two lists. Configured publish
    /// names that match no message are reported as warnings and otherwise
    /// ignored.
    ///
    /// # Examples
    /// ```
    /// use asyncapi_openapi_transform::MessageClassifier;
    ///
    /// let classifier = MessageClassifier::new(["AddAudio"]);
    /// let classification = classifier.classify(["AddAudio", "AudioAdded"], &mut Vec::new());
    ///
    /// assert_eq!(classification.publish, vec!["AddAudio"]);
    /// assert_eq!(classification.subscribe, vec!["AudioAdded"]);
    /// ```
    pub fn classify<'a, I>(
        &self,
        names: I,
        warnings: &mut Vec<TransformWarning>,
    ) -> MessageClassification
    where
        I: IntoIterator<Item = &'a str>,
    {
        let publish: HashSet<&str> = self.publish.iter().map(String::as_str).collect();
        let mut seen: HashSet<&str> = HashSet::new();
        let mut classification = MessageClassification::default();

        for name in names {
            if publish.contains(name) {
                seen.insert(name);
                classification.publish.push(name.to_string());
            } else {
                classification.subscribe.push(name.to_string());
            }
        }

        for name in &self.publish {
            if !seen.contains(name.as_str()) {
                warnings.push(TransformWarning::UnmatchedPublishName(name.clone()));
            }
        }

        classification
    }
}
