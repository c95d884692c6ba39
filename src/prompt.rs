use std::io::{self, BufRead, Write};

use crate::Args;

/// Secrets and IDs needed to run, taken from the arguments or asked for interactively.
pub struct Credentials {
    pub vk_token: String,
    pub vk_user_id: String,
    pub yandex_disk_token: String,
}

impl Credentials {
    /// Fills in whatever `args` lacks by prompting, in the order VK token, VK user ID,
    /// Yandex Disk token.
    pub fn resolve<R: BufRead, W: Write>(
        args: &Args,
        input: &mut R,
        output: &mut W,
    ) -> io::Result<Self> {
        let vk_token = match &args.vk_token {
            Some(token) => token.clone(),
            None => prompt(input, output, "Enter VK token: ")?,
        };
        let vk_user_id = match &args.vk_user_id {
            Some(user_id) => user_id.clone(),
            None => prompt(input, output, "Enter VK user ID: ")?,
        };
        let yandex_disk_token = match &args.yandex_disk_token {
            Some(token) => token.clone(),
            None => prompt(input, output, "Enter Yandex Disk token: ")?,
        };

        Ok(Credentials {
            vk_token,
            vk_user_id,
            yandex_disk_token,
        })
    }
}

fn prompt<R: BufRead, W: Write>(input: &mut R, output: &mut W, label: &str) -> io::Result<String> {
    output.write_all(label.as_bytes())?;
    output.flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            format!("input ended while waiting for: {}", label.trim_end_matches(": ")),
        ));
    }

    Ok(line.trim().to_string())
}
