use super::aws::AwsAdapter;
use super::base::SourceAdapter;
use super::nvidia::NvidiaAdapter;
use super::uipath::UiPathAdapter;
use crate::types::Source;

/// Adapter for a source
pub fn create_adapter(source: Source) -> Box<dyn SourceAdapter> {
    match source {
        Source::UiPath => Box::new(UiPathAdapter::new()),
        Source::Nvidia => Box::new(NvidiaAdapter::new()),
        Source::Aws => Box::new(AwsAdapter::new()),
    }
}
