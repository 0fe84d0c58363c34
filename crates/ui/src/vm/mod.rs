mod quiz_vm;
mod time_fmt;

pub use quiz_vm::{
    OptionVm, QuestionVm, QuizHeaderVm, QuizScreen, ResultRowVm, ResultVm, ReviewRowVm, ReviewVm,
    LOCKED_REVIEW_NOTICE, URGENT_CLOCK_SECS, header_vm, screen_vm,
};
pub use time_fmt::format_datetime;
