mod confirm_dialog;
mod form;
mod picker;
mod table;
mod text_input;

pub use confirm_dialog::{ConfirmDialog, ConfirmEvent};
pub use form::{FormDialog, FormEvent, FormField, FormValues};
pub use picker::{PickerDialog, PickerEvent};
pub use table::{DataTable, TableEvent, TableView};
pub use text_input::{TextInput, TextInputEvent};
