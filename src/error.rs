use std::fmt::{Debug, Display, Formatter};

pub type RouteResult<T> = Result<T, RouteErr>;

/// What went wrong at the pipeline boundary.
///
/// A search that exhausts both colors without a covering tree is not an
/// error; callers get an empty outcome instead.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum RouteErrKind {
    InputUnreadable,
    MalformedCheckpoint,
}

pub struct RouteErr {
    kind: RouteErrKind,
    problem: String,
}

impl RouteErr {
    fn new(kind: RouteErrKind, problem: &str) -> Self {
        let mut problem = problem.to_string();
        if !(problem.ends_with('.') || problem.ends_with('!') || problem.ends_with('?')) {
            problem.push('.');
        }
        RouteErr { kind, problem }
    }

    pub fn input_unreadable(problem: &str) -> Self {
        RouteErr::new(RouteErrKind::InputUnreadable, problem)
    }

    pub fn malformed_checkpoint(problem: &str) -> Self {
        RouteErr::new(RouteErrKind::MalformedCheckpoint, problem)
    }

    pub fn kind(&self) -> RouteErrKind {
        self.kind
    }

    pub fn get_message(&self) -> &str {
        &self.problem
    }
}

impl Debug for RouteErr {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "RouteErr: {}", self.problem)
    }
}

impl Display for RouteErr {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.problem)
    }
}

impl From<std::io::Error> for RouteErr {
    fn from(cause: std::io::Error) -> Self {
        RouteErr::input_unreadable(&format!("{}", cause))
    }
}
