/// Command-mode commands and autocomplete logic

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
  Lists,
  AddList,
  Theme,
  Quit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
  pub kind: CommandKind,
  pub name: &'static str,
  pub aliases: &'static [&'static str],
  pub description: &'static str,
}

/// All available commands
pub const COMMANDS: &[Command] = &[
  Command {
    kind: CommandKind::Lists,
    name: "lists",
    aliases: &["l", "ls"],
    description: "Focus lists, clear filter",
  },
  Command {
    kind: CommandKind::AddList,
    name: "add-list",
    aliases: &["new", "al"],
    description: "Create a new list",
  },
  Command {
    kind: CommandKind::Theme,
    name: "theme",
    aliases: &["t", "dark", "light"],
    description: "Toggle light/dark theme",
  },
  Command {
    kind: CommandKind::Quit,
    name: "quit",
    aliases: &["q", "exit"],
    description: "Exit todolists",
  },
];

/// Look up a command by exact name or alias.
pub fn find(input: &str) -> Option<&'static Command> {
  let input = input.trim().to_lowercase();
  COMMANDS
    .iter()
    .find(|cmd| cmd.name == input || cmd.aliases.contains(&input.as_str()))
}

/// Get autocomplete suggestions for a given input, best match first
pub fn get_suggestions(input: &str) -> Vec<&'static Command> {
  let input_lower = input.trim().to_lowercase();

  if input_lower.is_empty() {
    return COMMANDS.iter().collect();
  }

  let mut matches: Vec<(&Command, u32)> = COMMANDS
    .iter()
    .filter_map(|cmd| match_rank(cmd, &input_lower).map(|rank| (cmd, rank)))
    .collect();

  // Stable sort keeps declaration order within a rank
  matches.sort_by_key(|(_, rank)| *rank);
  matches.into_iter().map(|(cmd, _)| cmd).collect()
}

/// Lower is better: exact name, exact alias, prefix, then substring.
fn match_rank(cmd: &Command, input: &str) -> Option<u32> {
  if cmd.name == input {
    Some(0)
  } else if cmd.aliases.contains(&input) {
    Some(1)
  } else if cmd.name.starts_with(input) {
    Some(2)
  } else if cmd.aliases.iter().any(|a| a.starts_with(input)) {
    Some(3)
  } else if cmd.name.contains(input) {
    Some(4)
  } else if cmd.aliases.iter().any(|a| a.contains(input)) {
    Some(5)
  } else {
    None
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_empty_input_returns_all() {
    assert_eq!(get_suggestions("").len(), COMMANDS.len());
  }

  #[test]
  fn test_exact_match_first() {
    let suggestions = get_suggestions("lists");
    assert_eq!(suggestions[0].kind, CommandKind::Lists);
  }

  #[test]
  fn test_alias_beats_prefix() {
    // "t" is an alias of theme and would not match anything else by prefix
    assert_eq!(get_suggestions("t")[0].kind, CommandKind::Theme);
    assert_eq!(get_suggestions("dark")[0].kind, CommandKind::Theme);
  }

  #[test]
  fn test_prefix_and_substring() {
    assert_eq!(get_suggestions("add")[0].kind, CommandKind::AddList);
    assert_eq!(get_suggestions("list")[0].kind, CommandKind::Lists);
    assert_eq!(get_suggestions("list")[1].kind, CommandKind::AddList);
  }

  #[test]
  fn test_no_match() {
    assert!(get_suggestions("zzz").is_empty());
  }

  #[test]
  fn test_find() {
    assert_eq!(find(" Q ").map(|c| c.kind), Some(CommandKind::Quit));
    assert_eq!(find("new").map(|c| c.kind), Some(CommandKind::AddList));
    assert!(find("th").is_none());
  }
}
