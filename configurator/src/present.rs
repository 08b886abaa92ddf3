//! Line-oriented presenter driving a [`Session`] over any reader/writer pair.
//!
//! Choices are answered by number or by name; `:undo` steps back and `:quit`
//! ends the session without saving. At a composable save, `+` returns to
//! module selection.

use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::debug;

use crate::core::schema::SchemaProvider;
use crate::core::types::Question;
use crate::io::screens::Screens;
use crate::session::{AnswerOutcome, Session};
use crate::validate::Validator;

const UNDO_COMMAND: &str = ":undo";
const QUIT_COMMAND: &str = ":quit";
const ADD_ANOTHER_COMMAND: &str = "+";

/// How an interactive session ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEnd {
    Saved(PathBuf),
    /// `:quit` or end of input before a save.
    Quit,
}

/// Collaborators the presenter needs besides the session itself.
pub struct Presenter<'a> {
    pub validator: &'a Validator,
    pub screens: &'a Screens,
    pub workflows_dir: &'a Path,
}

impl Presenter<'_> {
    /// Ask questions until the workflow is saved or the user quits.
    pub fn run<P, R, W>(
        &self,
        session: &mut Session<P>,
        mut input: R,
        mut output: W,
    ) -> Result<SessionEnd>
    where
        P: SchemaProvider,
        R: BufRead,
        W: Write,
    {
        let mut line = String::new();
        loop {
            self.show(session, &mut output)?;

            line.clear();
            let read = input.read_line(&mut line).context("read answer")?;
            if read == 0 {
                debug!("input closed");
                return Ok(SessionEnd::Quit);
            }
            let raw = line.trim_end_matches(['\n', '\r']);

            match raw {
                "" => continue,
                QUIT_COMMAND => return Ok(SessionEnd::Quit),
                UNDO_COMMAND => {
                    if !session.undo() {
                        writeln!(output, "nothing to undo")?;
                    }
                    continue;
                }
                _ => {}
            }

            if let Some(end) = self.handle(session, raw, &mut output)? {
                return Ok(end);
            }
        }
    }

    fn show<P: SchemaProvider, W: Write>(
        &self,
        session: &Session<P>,
        output: &mut W,
    ) -> Result<()> {
        let summary = self.screens.render_summary(session.current().answers())?;
        if !summary.trim().is_empty() {
            writeln!(output, "{}", summary.trim_end())?;
        }
        let screen = self
            .screens
            .render_question(session.question(), self.workflows_dir)?;
        writeln!(output, "{screen}")?;
        write!(output, "> ")?;
        output.flush().context("flush output")?;
        Ok(())
    }

    fn handle<P: SchemaProvider, W: Write>(
        &self,
        session: &mut Session<P>,
        raw: &str,
        output: &mut W,
    ) -> Result<Option<SessionEnd>> {
        match session.question().clone() {
            Question::Choice { field, options } => match pick(&options, raw) {
                Some(chosen) => {
                    session.answer(self.validator, &field, &chosen)?;
                }
                None => writeln!(output, "'{raw}' is not one of the listed options")?,
            },
            Question::TextInput { field, .. } => {
                if let AnswerOutcome::Rejected(rejection) =
                    session.answer(self.validator, &field, raw)?
                {
                    writeln!(output, "{rejection}")?;
                }
            }
            Question::Save { composable } => {
                if composable && raw == ADD_ANOTHER_COMMAND {
                    session.add_another()?;
                    return Ok(None);
                }
                match session.save(self.workflows_dir, raw) {
                    Ok(path) => {
                        writeln!(output, "saved workflow to {}", path.display())?;
                        return Ok(Some(SessionEnd::Saved(path)));
                    }
                    Err(err) => writeln!(output, "could not save workflow: {err:#}")?,
                }
            }
        }
        Ok(None)
    }
}

/// Resolve a 1-based index or an exact option name.
fn pick(options: &[String], raw: &str) -> Option<String> {
    if let Ok(index) = raw.trim().parse::<usize>() {
        return index
            .checked_sub(1)
            .and_then(|i| options.get(i))
            .cloned();
    }
    options.iter().find(|option| option.as_str() == raw.trim()).cloned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io::Cursor;

    use crate::core::types::{Arg, ArgType, Phase};
    use crate::test_support::StaticSchema;

    fn schema() -> StaticSchema {
        StaticSchema::new()
            .module(Phase::Select, "local", vec![Arg::new("count", ArgType::Int, true)])
            .module(Phase::Analyse, "frames", vec![Arg::new("fps", ArgType::Int, true)])
            .module(Phase::Analyse, "ranking", Vec::new())
    }

    fn run_script(script: &str) -> (SessionEnd, String, tempfile::TempDir, usize) {
        let temp = tempfile::tempdir().expect("tempdir");
        let validator = Validator::new(temp.path());
        let screens = Screens::new().expect("screens");
        let workflows_dir = temp.path().join("workflows");
        let presenter = Presenter {
            validator: &validator,
            screens: &screens,
            workflows_dir: &workflows_dir,
        };
        let mut session = Session::start(schema()).expect("start");
        let mut output = Vec::new();
        let end = presenter
            .run(&mut session, Cursor::new(script.to_string()), &mut output)
            .expect("run");
        let depth = session.depth();
        (end, String::from_utf8(output).expect("utf8"), temp, depth)
    }

    #[test]
    fn pick_accepts_index_or_name() {
        let options = vec!["select".to_string(), "analyse".to_string()];
        assert_eq!(pick(&options, "2"), Some("analyse".to_string()));
        assert_eq!(pick(&options, "select"), Some("select".to_string()));
        assert_eq!(pick(&options, "0"), None);
        assert_eq!(pick(&options, "3"), None);
        assert_eq!(pick(&options, "other"), None);
    }

    #[test]
    fn scripted_select_session_saves_workflow() {
        let (end, output, temp, _) = run_script("out\n1\nlocal\nabc\n7\nrun\n");

        let path = temp.path().join("workflows").join("run.yaml");
        assert_eq!(end, SessionEnd::Saved(path.clone()));
        assert!(output.contains("abc is not an integer"));
        assert_eq!(
            fs::read_to_string(&path).expect("read"),
            "phase: select\nfolder: out\nmodule: local\nconfig:\n  count: 7\n"
        );
    }

    #[test]
    fn plus_adds_another_analyser() {
        let script = "out\nanalyse\nframes\na,b\n25\n+\nranking\nall\npipeline\n";
        let (end, _, temp, _) = run_script(script);

        let path = temp.path().join("workflows").join("pipeline.yaml");
        assert_eq!(end, SessionEnd::Saved(path.clone()));
        let saved = fs::read_to_string(&path).expect("read");
        assert!(saved.contains("module: meta"));
        assert!(saved.contains("children:"));
    }

    #[test]
    fn undo_and_quit_commands() {
        let (end, output, _temp, depth) = run_script(":undo\nout\n:undo\nout\n1\n:quit\n");
        assert_eq!(end, SessionEnd::Quit);
        assert!(output.contains("nothing to undo"));
        assert_eq!(depth, 3);
    }

    #[test]
    fn unknown_choice_is_reported_and_reasked() {
        let (end, output, _temp, depth) = run_script("out\nanalyze\n");
        assert_eq!(end, SessionEnd::Quit);
        assert!(output.contains("'analyze' is not one of the listed options"));
        assert_eq!(depth, 2);
    }

    #[test]
    fn bad_save_name_is_reported_and_retried() {
        let (end, output, temp, _) = run_script("out\nselect\nlocal\n3\n../up\nok\n");
        assert!(output.contains("could not save workflow"));
        assert_eq!(
            end,
            SessionEnd::Saved(temp.path().join("workflows").join("ok.yaml"))
        );
    }
}
