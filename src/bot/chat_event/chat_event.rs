/// Platform independent view of an inbound text message.
#[derive(Debug, Clone)]
pub struct ChatEvent {
    pub message_id: String,
    pub author: ChatUser,
    pub guild: Option<GuildInfo>,
    pub channel: ChannelInfo,
    /// Role ids held by the author in the guild, empty for direct messages.
    pub member_roles: Vec<String>,
    pub content: String,
    /// Content with mentions resolved to names, used when mirroring.
    pub clean_content: String,
}

#[derive(Debug, Clone)]
pub struct ChatUser {
    pub id: String,
    pub tag: String,
    pub bot: bool,
}

#[derive(Debug, Clone)]
pub struct GuildInfo {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone)]
pub struct ChannelInfo {
    /// Names are looked up on demand through the client.
    pub id: String,
    pub is_dm: bool,
}

impl ChatEvent {
    pub fn guild_name(&self) -> &str {
        self.guild.as_ref().map(|g| g.name.as_str()).unwrap_or("Direct Message")
    }

    pub fn is_dm(&self) -> bool {
        self.channel.is_dm
    }
}
