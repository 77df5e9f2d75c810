mod color_picker;
mod command_input;
mod confirm;
mod filter_input;
mod input;
mod prompt;

pub use color_picker::{ColorPicker, ColorPickerEvent};
pub use command_input::{CommandEvent, CommandInput};
pub use confirm::{ConfirmDialog, ConfirmEvent};
pub use filter_input::{FilterEvent, FilterInput};
pub use input::{InputResult, TextInput};
pub use prompt::{PromptEvent, TextPrompt};

/// What a component did with a key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyResult<T> {
  /// Consumed, nothing for the parent to do
  Handled,
  /// Consumed, and the parent should act on this event
  Event(T),
  /// Not consumed; try the next handler
  NotHandled,
}
