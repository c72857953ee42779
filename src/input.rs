//! Single keydown dispatcher.
//!
//! Routes are tried in descending priority. A route that consumes the key stops
//! the walk; one that only observes lets lower routes see it too.

/// Where keyboard focus was when the key went down.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Focus {
    Page,
    /// An `<input>` element, with its id when it has one.
    TextInput(Option<String>),
}

impl Focus {
    pub fn is_text_input(&self) -> bool {
        matches!(self, Focus::TextInput(_))
    }

    pub fn is_input(&self, id: &str) -> bool {
        matches!(self, Focus::TextInput(Some(f)) if f == id)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyPress {
    pub key: String,
    pub focus: Focus,
}

impl KeyPress {
    pub fn new(key: impl Into<String>, focus: Focus) -> Self {
        Self {
            key: key.into(),
            focus,
        }
    }

    pub fn on_page(key: impl Into<String>) -> Self {
        Self::new(key, Focus::Page)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyOutcome {
    Ignored,
    Observed,
    Consumed,
}

#[derive(Clone, Copy, Debug)]
struct Registration<R> {
    route: R,
    priority: i32,
    in_text_input: bool,
}

#[derive(Clone, Debug, Default)]
pub struct InputDispatcher<R> {
    routes: Vec<Registration<R>>,
}

impl<R: Copy> InputDispatcher<R> {
    pub fn new() -> Self {
        Self { routes: Vec::new() }
    }

    /// Add a route. Equal priorities keep registration order.
    pub fn register(&mut self, route: R, priority: i32, in_text_input: bool) {
        let at = self
            .routes
            .iter()
            .position(|r| r.priority < priority)
            .unwrap_or(self.routes.len());
        self.routes.insert(
            at,
            Registration {
                route,
                priority,
                in_text_input,
            },
        );
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Offer `press` to each eligible route. Returns the routes that reacted,
    /// in the order they ran.
    pub fn dispatch<F>(&self, press: &KeyPress, mut handle: F) -> Vec<R>
    where
        F: FnMut(R, &KeyPress) -> KeyOutcome,
    {
        let mut reacted = Vec::new();
        for reg in &self.routes {
            if press.focus.is_text_input() && !reg.in_text_input {
                continue;
            }
            match handle(reg.route, press) {
                KeyOutcome::Ignored => {}
                KeyOutcome::Observed => reacted.push(reg.route),
                KeyOutcome::Consumed => {
                    reacted.push(reg.route);
                    break;
                }
            }
        }
        reacted
    }
}
