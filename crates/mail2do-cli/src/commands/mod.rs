//! Command implementations.

pub mod parse;
pub mod run;
pub mod schema;
pub mod stamp_date;
pub mod upload;

pub use self::parse::execute_parse;
pub use self::run::execute_run;
pub use self::schema::execute_schema;
pub use self::stamp_date::execute_stamp_date;
pub use self::upload::execute_upload;

use crate::config::{Config, Credentials};
use crate::error::Result;
use mail2do_domain::SchemaDescriptor;
use mail2do_llm::OpenAiProvider;
use mail2do_store::{NotionClient, SchemaLoader};

/// Connect to the configured destination database.
pub(crate) fn notion_client(config: &Config, credentials: &Credentials) -> Result<NotionClient> {
    let mut notion = config.notion.clone();
    notion.database_id = config.database_id()?.to_string();
    Ok(NotionClient::new(credentials.notion_token()?, notion)?)
}

/// Create the model provider.
pub(crate) fn openai_provider(config: &Config, credentials: &Credentials) -> Result<OpenAiProvider> {
    Ok(OpenAiProvider::new(
        credentials.openai_api_key()?,
        config.openai.clone(),
    )?)
}

/// Load the destination schema.
pub(crate) fn load_schema(
    client: &NotionClient,
    config: &Config,
    reference_values: bool,
) -> Result<SchemaDescriptor> {
    let mut loader =
        SchemaLoader::new(client).with_max_reference_rows(config.notion.max_reference_rows);
    if !reference_values {
        loader = loader.without_reference_values();
    }

    Ok(loader.load(client.database_id())?)
}
