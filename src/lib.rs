pub mod ebi_framework {
    pub mod ebi_command;
    pub mod ebi_input;
    pub mod ebi_output;
    pub mod exportable;
    pub mod importable;
    pub mod infoable;
}
pub mod ebi_commands {
    pub mod ebi_command_align;
    pub mod ebi_command_info;
    pub mod ebi_command_state_space;
    pub mod ebi_command_validate;
}
pub mod ebi_objects {
    pub mod synchronous_product_net;
    pub mod unfolding_alignment;
}
pub mod unfolding {
    pub mod co_set;
    pub mod cutoff;
    pub mod heuristic;
    pub mod occurrence_net;
    pub mod possible_extensions;
    pub mod unfolding_net;
}
pub mod techniques {
    pub mod state_space_align;
    pub mod unfolding_align;
}
pub mod line_reader;
pub mod marking;
