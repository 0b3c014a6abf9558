#[cfg(test)]
#[path = "slash_commands_test.rs"]
mod tests;

pub struct SlashCommand {
    command: String,
    pub args: Vec<String>,
}

impl SlashCommand {
    pub fn parse(text: &str) -> Option<SlashCommand> {
        let mut args = text
            .trim()
            .split(' ')
            .filter(|e| return !e.is_empty())
            .map(|e| return e.to_string())
            .collect::<Vec<String>>();
        if args.is_empty() {
            return None;
        }
        let prefix = args[0].to_string();
        args.remove(0);

        let cmd = SlashCommand {
            command: prefix,
            args,
        };
        if cmd.is_quit()
            || cmd.is_new()
            || cmd.is_list()
            || cmd.is_switch()
            || cmd.is_delete()
            || cmd.is_listen()
            || cmd.is_apps()
            || cmd.is_help()
        {
            return Some(cmd);
        }

        return None;
    }

    pub fn id_arg(&self) -> Option<&str> {
        return self.args.first().map(|e| return e.as_str());
    }

    pub fn is_quit(&self) -> bool {
        return ["/q", "/quit", "/exit"].contains(&self.command.as_str());
    }

    pub fn is_new(&self) -> bool {
        return ["/n", "/new"].contains(&self.command.as_str());
    }

    pub fn is_list(&self) -> bool {
        return ["/ls", "/list"].contains(&self.command.as_str());
    }

    pub fn is_switch(&self) -> bool {
        return ["/s", "/switch"].contains(&self.command.as_str());
    }

    pub fn is_delete(&self) -> bool {
        return ["/d", "/delete"].contains(&self.command.as_str());
    }

    pub fn is_listen(&self) -> bool {
        return ["/l", "/listen"].contains(&self.command.as_str());
    }

    pub fn is_apps(&self) -> bool {
        return ["/a", "/apps"].contains(&self.command.as_str());
    }

    pub fn is_help(&self) -> bool {
        return ["/h", "/help"].contains(&self.command.as_str());
    }
}
