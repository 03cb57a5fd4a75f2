pub mod providers;

pub use providers::openai::OpenAiProvider;
pub use providers::scripted::ScriptedProvider;
