//! Static portfolio content.
//!
//! Everything a visitor reads lives here; the page modules only lay it out.

/// Opening line of the splash page, split around the highlighted name.
pub const SPLASH_PREFIX: &str = "Hi! Welcome to ";
#[allow(missing_docs)]
pub const SPLASH_NAME: &str = "Sam's";
#[allow(missing_docs)]
pub const SPLASH_SUFFIX: &str = " termfolio, come say hi!";
/// Where the source lives.
pub const SOURCE_LINK: &str = "https://github.com/oxur/termfolio";

/// Menu entries and their descriptions, in menu order.
pub const MENU_ITEMS: [(&str, &str); 6] = [
    ("About", "Who I am"),
    ("Projects", "Selected work"),
    ("Education", "Academic timeline"),
    ("Contact", "Get in touch"),
    ("Feed", "Latest posts"),
    ("Privacy", "Tracking control"),
];

/// How a run of about-page text is emphasised once settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Emphasis {
    /// Plain text.
    Normal,
    /// Bold text.
    Bold,
    /// Italic text.
    Italic,
    /// A link label.
    Link,
}

/// The about page, as emphasised runs. Their concatenation is the plain text
/// the typewriter reveals.
pub const ABOUT: &[(Emphasis, &str)] = &[
    (Emphasis::Normal, "Hey there, I'm "),
    (Emphasis::Bold, "Sam Rivera"),
    (Emphasis::Normal, " -- most people call me "),
    (Emphasis::Italic, "Riv"),
    (
        Emphasis::Normal,
        ". I build systems software for a living and terminal toys for fun. \
         I like small tools that do one thing well, fast feedback loops, \
         and documentation that answers the question you actually had.",
    ),
    (Emphasis::Normal, "\n\n"),
    (Emphasis::Normal, "These days I work on storage engines at "),
    (Emphasis::Link, "Tidewater Labs"),
    (
        Emphasis::Normal,
        ", tinker with SSH-served apps like this one, and maintain a handful of \
         open source crates. Outside of code I shoot film photos, bake bread, \
         and lose at chess to my ",
    ),
    (Emphasis::Italic, "very"),
    (Emphasis::Normal, " patient friends."),
];

/// A portfolio project.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Project {
    /// Project name.
    pub name: &'static str,
    /// One-line description.
    pub desc: &'static str,
    /// Technologies used.
    pub tech: &'static str,
    /// Repository or homepage, with or without scheme.
    pub link: &'static str,
}

#[allow(missing_docs)]
pub const PROJECTS: [Project; 4] = [
    Project {
        name: "termfolio",
        desc: "This app: a portfolio you reach over SSH",
        tech: "Rust, russh, ratatui",
        link: "github.com/oxur/termfolio",
    },
    Project {
        name: "Driftwood KV",
        desc: "Log-structured key-value store with crash-safe compaction",
        tech: "Rust, io_uring",
        link: "github.com/sam-rivera/driftwood",
    },
    Project {
        name: "Lantern",
        desc: "Tiny static site generator with live reload",
        tech: "Rust, Markdown",
        link: "github.com/sam-rivera/lantern",
    },
    Project {
        name: "HTTP From Scratch",
        desc: "HTTP/1.1 server built directly on TCP sockets",
        tech: "Rust",
        link: "github.com/sam-rivera/http-from-scratch",
    },
];

/// An education entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Education {
    /// Degree or programme.
    pub role: &'static str,
    /// Institution.
    pub company: &'static str,
    /// Years attended.
    pub period: &'static str,
    /// School or department.
    pub desc: &'static str,
    /// Institution URL.
    pub url: &'static str,
}

#[allow(missing_docs)]
pub const EDUCATION: [Education; 5] = [
    Education {
        role: "Computer Science, M.S.",
        company: "Lakeshore University",
        period: "2022–2024",
        desc: "School of Engineering and Applied Science",
        url: "https://lakeshore.example.edu/",
    },
    Education {
        role: "Computer Science, B.S.",
        company: "Harbor State",
        period: "2018–2022",
        desc: "College of Computing",
        url: "https://harborstate.example.edu/",
    },
    Education {
        role: "Mathematics, Minor",
        company: "Harbor State",
        period: "2019–2022",
        desc: "College of Sciences",
        url: "https://harborstate.example.edu/math",
    },
    Education {
        role: "Distributed Systems Summer School",
        company: "Northfield Institute",
        period: "2021",
        desc: "Consensus, replication, and failure detection",
        url: "https://northfield.example.edu/",
    },
    Education {
        role: "Exchange Semester",
        company: "Kanazawa Tech",
        period: "2020",
        desc: "Japanese language and systems programming",
        url: "https://kanazawa-tech.example.jp/",
    },
];

/// A contact method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Contact {
    /// Service name.
    pub label: &'static str,
    /// Handle or address shown to the visitor.
    pub handle: &'static str,
}

/// Direct contact methods (left column).
pub const CONTACTS: [Contact; 3] = [
    Contact {
        label: "Email",
        handle: "hi@riv.example.dev",
    },
    Contact {
        label: "Matrix",
        handle: "@riv:example.dev",
    },
    Contact {
        label: "GitHub",
        handle: "@sam-rivera",
    },
];

/// Social profiles (right column).
pub const SOCIAL: [Contact; 2] = [
    Contact {
        label: "Mastodon",
        handle: "@riv@hachyderm.io",
    },
    Contact {
        label: "Bluesky",
        handle: "@riv.example.dev",
    },
];

/// The about page as plain text.
#[must_use]
pub fn about_text() -> String {
    ABOUT.iter().map(|(_, text)| *text).collect()
}
