pub mod domain;
pub mod ports;
pub mod slug;

pub use domain::{
    default_units, group_by_unit, normalize_code, Lecture, LectureSummary, NewLecture, Role,
    SessionUser, Subject, Unit,
};
pub use ports::{
    ContentStore, GeneratorError, LectureGenerator, OcrError, OcrService, PageRenderer,
    PdfAttachment, RenderError, StoreError, StoreResult,
};
pub use slug::lecture_id_from_title;
