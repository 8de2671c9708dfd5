/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! The application's user-defined parameters.
//!
//! A [`Configuration`] is built using the builder pattern, for example:
//!
//! ```ignore
//! let configuration = Configuration::builder()
//!     .moderation_words(vec!["spam".to_string()])
//!     .log_events(true)
//!     .build();
//! ```
//!
//! ## Moderation words
//!
//! `moderation_words` is the word list this replica attaches to its votes through
//! [`extend_vote`](crate::app::ForumApp::extend_vote). Replicas may be configured with different
//! lists; only words that more than a third of the registry agree on take effect in a block.
//!
//! ## Log Events
//!
//! The application logs using the [log](https://docs.rs/log/latest/log/) crate. To get these
//! messages printed onto a terminal or to a file, set up a [logging
//! implementation](https://docs.rs/log/latest/log/#available-logging-implementations).

use typed_builder::TypedBuilder;

/// Stores the user-defined parameters required to start the application.
#[derive(Clone, TypedBuilder)]
#[builder(builder_method(doc = "
    Create a builder for building a [Configuration]. On the builder call the following methods to construct a valid [Configuration].

    Required:
    - `.moderation_words(...)`
    - `.log_events(...)`
"))]
pub struct Configuration {
    #[builder(setter(
        doc = "Set the word list this replica votes to moderate with. Duplicates are discarded, keeping first occurrences. Required."
    ))]
    pub moderation_words: Vec<String>,
    #[builder(setter(doc = "Enable logging? Required."))]
    pub log_events: bool,
}
